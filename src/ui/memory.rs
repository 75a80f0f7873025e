use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::memory::{Difficulty, Face, MemoryEvent, MemoryGame, Phase};
use arcade::{GameId, MemoryError};

use super::launcher::format_clock;
use super::session::{GameResult, Session};
use super::widgets::{
    centered_rect, render_hints, render_info, render_popup, render_status, split_screen,
    titled_block,
};
use super::{Screen, Transition};

const SYMBOLS: [char; 18] = [
    '♠', '♥', '♦', '♣', '★', '☀', '☂', '☃', '♪', '♫', '⚑', '✈', '⚓', '☎', '✿', '❄', '☘', '♞',
];
const MISMATCH_DELAY: Duration = Duration::from_millis(1000);
const HINT_DURATION: Duration = Duration::from_millis(1500);
const CLOCK_POLL: Duration = Duration::from_millis(250);
const CARD_WIDTH: u16 = 6;

pub struct MemoryScreen {
    game: MemoryGame,
    cursor: usize,
    conceal_at: Option<Instant>,
    hint: Option<((usize, usize), Instant)>,
    last_clock: Instant,
    status: String,
    new_best: bool,
}

impl MemoryScreen {
    pub fn new(session: &mut Session) -> Self {
        let mut screen = Self {
            game: MemoryGame::new(session.config.memory_difficulty),
            cursor: 0,
            conceal_at: None,
            hint: None,
            last_clock: Instant::now(),
            status: String::new(),
            new_best: false,
        };
        screen.restart(session);
        screen
    }

    fn restart(&mut self, session: &mut Session) {
        self.game.start();
        session.begin(GameId::Memory);
        self.cursor = 0;
        self.conceal_at = None;
        self.hint = None;
        self.last_clock = Instant::now();
        self.new_best = false;
        self.drain_events(session);
    }

    fn cycle_difficulty(&mut self) {
        let all = Difficulty::ALL;
        let i = all
            .iter()
            .position(|&d| d == self.game.difficulty())
            .unwrap_or(0);
        self.game.set_difficulty(all[(i + 1) % all.len()]);
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let (rows, cols) = self.game.layout();
        let (x, y) = ((self.cursor % cols) as isize, (self.cursor / cols) as isize);
        let nx = (x + dx).clamp(0, cols as isize - 1) as usize;
        let ny = (y + dy).clamp(0, rows as isize - 1) as usize;
        self.cursor = ny * cols + nx;
    }

    fn drain_events(&mut self, session: &mut Session) {
        for event in self.game.take_events() {
            match event {
                MemoryEvent::Started { difficulty } => {
                    self.status = format!("{} pairs to find", difficulty.pairs());
                }
                MemoryEvent::Matched { pairs } => {
                    self.status = format!("Match! {pairs}/{}", self.game.total_pairs());
                }
                MemoryEvent::Mismatched => {
                    self.status = "No match".into();
                    self.conceal_at = Some(Instant::now() + MISMATCH_DELAY);
                }
                MemoryEvent::HintUsed { remaining } => {
                    self.status = format!("Hint shown, {remaining} left");
                }
                MemoryEvent::Completed { elapsed_ms, .. } => {
                    self.new_best = session.finish(GameId::Memory, GameResult::timed(elapsed_ms));
                }
                MemoryEvent::Paused | MemoryEvent::Resumed => {}
            }
        }
    }

    fn card_lines(&self) -> Vec<Line<'static>> {
        let (_, cols) = self.game.layout();
        let hinted = self
            .hint
            .map(|((a, b), _)| [a, b])
            .unwrap_or([usize::MAX; 2]);

        self.game
            .cards()
            .chunks(cols)
            .enumerate()
            .flat_map(|(row, cards)| {
                let spans: Vec<Span> = cards
                    .iter()
                    .enumerate()
                    .map(|(col, card)| {
                        let index = row * cols + col;
                        let symbol = SYMBOLS[card.symbol as usize % SYMBOLS.len()];
                        let (text, mut style) = match card.face {
                            Face::Down => ("[ ? ]".to_string(), Style::default().fg(Color::Blue)),
                            Face::Up => (format!("[ {symbol} ]"), Style::default().fg(Color::Yellow)),
                            Face::Matched => (format!("[ {symbol} ]"), Style::default().fg(Color::Green)),
                        };
                        if hinted.contains(&index) {
                            style = style.bg(Color::Magenta);
                        }
                        if index == self.cursor {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Span::styled(format!("{text} "), style)
                    })
                    .collect();
                [Line::from(spans), Line::from("")]
            })
            .collect()
    }
}

impl Screen for MemoryScreen {
    fn render(&self, frame: &mut Frame, session: &Session) {
        let (body, status, hints) = split_screen(frame.size());
        let (rows, cols) = self.game.layout();
        let grid_width = cols as u16 * CARD_WIDTH + 2;
        let grid_height = rows as u16 * 2 + 2;
        let info_width = 16;
        let area = centered_rect(grid_width + info_width, grid_height.max(17), body);

        let columns = Layout::horizontal([
            Constraint::Length(grid_width),
            Constraint::Length(info_width),
        ])
        .split(area);

        let grid = Paragraph::new(self.card_lines()).block(titled_block(" Memory "));
        frame.render_widget(grid, columns[0]);

        let best = session
            .records
            .stats(GameId::Memory)
            .best_time_ms
            .map_or_else(|| "-".to_string(), format_clock);
        render_info(
            frame,
            " Info ",
            &[
                ("Time", format_clock(self.game.elapsed_ms())),
                ("Best", best),
                ("Moves", self.game.moves().to_string()),
                (
                    "Pairs",
                    format!("{}/{}", self.game.matched_pairs(), self.game.total_pairs()),
                ),
                ("Hints", self.game.hints_left().to_string()),
            ],
            columns[1],
        );

        render_status(frame, &self.status, status);
        render_hints(
            frame,
            "Arrows: Move | Enter: Flip | H: Hint | P: Pause | N: New | ESC: Menu",
            hints,
        );

        match self.game.phase() {
            Phase::Paused => render_popup(
                frame,
                " Paused ",
                ("PAUSED", Color::Yellow),
                &["Press P to continue".into()],
            ),
            Phase::Complete => {
                let mut body = vec![
                    format!("Time: {}", format_clock(self.game.elapsed_ms())),
                    format!("Moves: {}", self.game.moves()),
                ];
                if self.new_best {
                    body.push("New best time!".into());
                }
                body.push(String::new());
                body.push(format!("D: next difficulty (now {})", self.game.difficulty().name()));
                body.push("N: new game | ESC: menu".into());
                render_popup(frame, " Complete ", ("ALL PAIRS FOUND", Color::Green), &body);
            }
            Phase::Idle | Phase::Running => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Transition::Leave,
            KeyCode::Char('n') | KeyCode::Char('N') => self.restart(session),
            KeyCode::Char('d') | KeyCode::Char('D') if self.game.phase() == Phase::Complete => {
                self.cycle_difficulty();
                self.restart(session);
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                let _ = match self.game.phase() {
                    Phase::Paused => self.game.resume(),
                    _ => self.game.pause(),
                };
                self.last_clock = Instant::now();
            }
            KeyCode::Up | KeyCode::Char('w') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('s') => self.move_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('a') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('d') => self.move_cursor(1, 0),
            KeyCode::Enter | KeyCode::Char(' ') => match self.game.flip(self.cursor) {
                Err(MemoryError::AwaitingConceal) => {
                    // Flip back early instead of waiting out the delay.
                    self.game.conceal();
                    self.conceal_at = None;
                    let _ = self.game.flip(self.cursor);
                }
                Ok(_) | Err(_) => {}
            },
            KeyCode::Char('h') | KeyCode::Char('H') => match self.game.hint() {
                Ok(Some(pair)) => self.hint = Some((pair, Instant::now() + HINT_DURATION)),
                Ok(None) => self.status = "No pair left to hint".into(),
                Err(MemoryError::NoHints) => self.status = "No hints left".into(),
                Err(_) => {}
            },
            _ => {}
        }
        self.drain_events(session);
        Transition::Stay
    }

    fn update(&mut self, session: &mut Session) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_clock);
        self.last_clock = now;
        self.game.advance(elapsed.as_millis() as u64);

        if self.conceal_at.is_some_and(|at| now >= at) {
            self.game.conceal();
            self.conceal_at = None;
        }
        if self.hint.is_some_and(|(_, until)| now >= until) {
            self.hint = None;
        }
        self.drain_events(session);
    }

    fn poll_timeout(&self) -> Duration {
        CLOCK_POLL
    }
}
