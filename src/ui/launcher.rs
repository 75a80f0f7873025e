use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::records::GameStats;
use arcade::GameId;

use super::session::Session;
use super::widgets::{centered_rect, render_hints, split_screen, titled_block};

pub enum LauncherAction {
    None,
    Open(GameId),
    Quit,
}

pub struct Launcher {
    selected: usize,
}

impl Launcher {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> LauncherAction {
        let count = GameId::ALL.len();
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => LauncherAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = (self.selected + count - 1) % count;
                LauncherAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % count;
                LauncherAction::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => LauncherAction::Open(GameId::ALL[self.selected]),
            _ => LauncherAction::None,
        }
    }

    pub fn render(&self, frame: &mut Frame, session: &Session) {
        let (body, _, hints) = split_screen(frame.size());
        let area = centered_rect(56, GameId::ALL.len() as u16 * 2 + 8, body);

        let rows = Layout::vertical([Constraint::Fill(1), Constraint::Length(4)]).split(area);

        let mut lines = vec![Line::from("")];
        for (i, game) in GameId::ALL.into_iter().enumerate() {
            let stats = session.records.stats(game);
            let style = if i == self.selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<12}", game.title()), style),
                Span::styled(summary(game, &stats), Style::default().fg(Color::DarkGray)),
            ]));
            lines.push(Line::from(""));
        }
        let list = Paragraph::new(lines).block(titled_block(" Arcade "));
        frame.render_widget(list, rows[0]);

        let favorite = session
            .records
            .favorite()
            .map(|g| g.title())
            .unwrap_or("-");
        let totals = Paragraph::new(vec![
            Line::from(format!("Games played: {}", session.records.total_played())),
            Line::from(format!("Favourite: {favorite}")),
        ])
        .alignment(Alignment::Center)
        .block(titled_block(" Totals "));
        frame.render_widget(totals, rows[1]);

        render_hints(frame, "↑↓: Select | Enter: Play | Q/ESC: Quit", hints);
    }
}

fn summary(game: GameId, stats: &GameStats) -> String {
    let best = match game {
        GameId::Memory => stats
            .best_time_ms
            .map(|ms| format!("best {}", format_clock(ms))),
        GameId::Battleship => Some(format!("{}W {}L", stats.wins, stats.losses)),
        GameId::Go => None,
        _ => stats.best_score.map(|s| format!("best {s}")),
    };
    match best {
        Some(best) => format!("played {:>3}  {best}", stats.played),
        None => format!("played {:>3}", stats.played),
    }
}

pub fn format_clock(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
