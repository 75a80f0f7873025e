use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::game2048::{Direction, Game2048, Game2048Event, Phase};
use arcade::{Game2048Error, GameId};

use super::session::{GameResult, Session};
use super::widgets::{
    centered_rect, render_hints, render_info, render_popup, render_status, split_screen,
    titled_block,
};
use super::{Screen, Transition};

const TILE_WIDTH: u16 = 7;
const TILE_HEIGHT: u16 = 3;

fn tile_color(value: u32) -> Color {
    match value {
        0 => Color::DarkGray,
        2 => Color::Rgb(238, 228, 218),
        4 => Color::Rgb(237, 224, 200),
        8 => Color::Rgb(242, 177, 121),
        16 => Color::Rgb(245, 149, 99),
        32 => Color::Rgb(246, 124, 95),
        64 => Color::Rgb(246, 94, 59),
        128 => Color::Rgb(237, 207, 114),
        256 => Color::Rgb(237, 204, 97),
        512 => Color::Rgb(237, 200, 80),
        1024 => Color::Rgb(237, 197, 63),
        2048 => Color::Rgb(237, 194, 46),
        _ => Color::Rgb(60, 58, 50),
    }
}

pub struct Game2048Screen {
    game: Game2048,
    status: String,
    new_best: bool,
    /// The win popup is shown once, then play continues.
    show_win: bool,
}

impl Game2048Screen {
    pub fn new(session: &mut Session) -> Self {
        let mut screen = Self {
            game: Game2048::new(session.config.game2048_size),
            status: String::new(),
            new_best: false,
            show_win: false,
        };
        screen.restart(session);
        screen
    }

    fn restart(&mut self, session: &mut Session) {
        self.game.start();
        session.begin(GameId::Game2048);
        self.new_best = false;
        self.show_win = false;
        self.drain_events(session);
    }

    fn drain_events(&mut self, session: &mut Session) {
        for event in self.game.take_events() {
            match event {
                Game2048Event::Started => self.status = "Join the tiles, get to 2048!".into(),
                Game2048Event::Slid { gained, .. } if gained > 0 => {
                    self.status = format!("+{gained}");
                }
                Game2048Event::Won => self.show_win = true,
                Game2048Event::Undone => {
                    self.status = format!("Undone, {} left", self.game.undos_left());
                }
                Game2048Event::GameOver { score, best_tile } => {
                    self.status = format!("No moves left. Best tile {best_tile}");
                    self.new_best = session.finish(GameId::Game2048, GameResult::scored(score));
                }
                Game2048Event::Slid { .. } | Game2048Event::TileSpawned { .. } => {}
            }
        }
    }

    fn render_tiles(&self, frame: &mut Frame, area: Rect) {
        let block = titled_block(" 2048 ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let grid = self.game.grid();
        let rows = Layout::vertical(vec![Constraint::Length(TILE_HEIGHT); grid.height()]).split(inner);
        for (y, row_area) in rows.iter().enumerate() {
            let cols =
                Layout::horizontal(vec![Constraint::Length(TILE_WIDTH); grid.width()]).split(*row_area);
            for (x, &value) in grid.row(y).iter().enumerate() {
                let style = Style::default()
                    .bg(tile_color(value))
                    .fg(if value <= 4 { Color::Black } else { Color::White })
                    .add_modifier(Modifier::BOLD);
                let label = if value == 0 { String::new() } else { value.to_string() };
                let tile = Paragraph::new(vec![Line::from(""), Line::from(Span::raw(label))])
                    .alignment(Alignment::Center)
                    .style(style);
                frame.render_widget(tile, cols[x]);
            }
        }
    }
}

impl Screen for Game2048Screen {
    fn render(&self, frame: &mut Frame, session: &Session) {
        let (body, status, hints) = split_screen(frame.size());
        let size = self.game.size() as u16;
        let board_width = size * TILE_WIDTH + 2;
        let board_height = size * TILE_HEIGHT + 2;
        let info_width = 16;
        let area = centered_rect(board_width + info_width, board_height.max(16), body);

        let columns = Layout::horizontal([
            Constraint::Length(board_width),
            Constraint::Length(info_width),
        ])
        .split(area);

        let board_area = Rect {
            height: board_height.min(columns[0].height),
            ..columns[0]
        };
        self.render_tiles(frame, board_area);

        let best = session
            .records
            .stats(GameId::Game2048)
            .best_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        render_info(
            frame,
            " Info ",
            &[
                ("Score", self.game.score().to_string()),
                ("Best", best),
                ("Moves", self.game.moves().to_string()),
                ("Undos", self.game.undos_left().to_string()),
            ],
            columns[1],
        );

        render_status(frame, &self.status, status);
        render_hints(frame, "Arrows/WASD: Slide | U: Undo | N: New game | ESC: Menu", hints);

        if self.game.phase() == Phase::Over {
            let mut body = vec![
                format!("Score: {}", self.game.score()),
                format!("Best tile: {}", self.game.best_tile()),
            ];
            if self.new_best {
                body.push("New best score!".into());
            }
            body.push(String::new());
            body.push("N: new game | ESC: menu".into());
            render_popup(frame, " Game Over ", ("GAME OVER", Color::Red), &body);
        } else if self.show_win {
            render_popup(
                frame,
                " 2048 ",
                ("YOU WIN!", Color::Yellow),
                &["Any key: keep going".into(), "N: new game".into()],
            );
        }
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition {
        if self.show_win && !matches!(key, KeyCode::Char('n') | KeyCode::Esc) {
            self.show_win = false;
            return Transition::Stay;
        }

        let direction = match key {
            KeyCode::Esc | KeyCode::Char('q') => return Transition::Leave,
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.restart(session);
                return Transition::Stay;
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                if let Err(Game2048Error::NothingToUndo) = self.game.undo() {
                    self.status = "Nothing to undo".into();
                }
                None
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Some(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Some(Direction::Right),
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Some(Direction::Down),
            _ => None,
        };

        if let Some(direction) = direction {
            // NoChange is not worth reporting.
            let _ = self.game.slide(direction);
        }
        self.drain_events(session);
        Transition::Stay
    }
}
