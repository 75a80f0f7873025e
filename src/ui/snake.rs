use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::snake::{DeathCause, Difficulty, Direction, Phase, Snake, SnakeEvent, FIELD_SIZE};
use arcade::{GameId, Point};

use super::session::{GameResult, Session};
use super::widgets::{
    centered_rect, render_hints, render_info, render_popup, render_status, split_screen,
    titled_block, BLOCK_CHAR, EMPTY_CHAR,
};
use super::{Screen, Transition, IDLE_POLL};

pub struct SnakeScreen {
    game: Snake,
    last_step: Instant,
    status: String,
    new_best: bool,
}

impl SnakeScreen {
    pub fn new(session: &mut Session) -> Self {
        let mut screen = Self {
            game: Snake::new(session.config.snake_difficulty),
            last_step: Instant::now(),
            status: String::new(),
            new_best: false,
        };
        screen.restart(session);
        screen
    }

    fn restart(&mut self, session: &mut Session) {
        self.game.start();
        session.begin(GameId::Snake);
        self.new_best = false;
        self.last_step = Instant::now();
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

    fn drain_events(&mut self, session: &mut Session) {
        for event in self.game.take_events() {
            match event {
                SnakeEvent::Started => {
                    self.status = format!("Difficulty: {}", self.game.difficulty().name());
                }
                SnakeEvent::Ate { length, .. } => self.status = format!("Length {length}"),
                SnakeEvent::SpeedUp(level) => self.status = format!("Speed level {level}"),
                SnakeEvent::GameOver { score, cause } => {
                    self.status = match cause {
                        DeathCause::Wall => "Hit the wall".into(),
                        DeathCause::SelfBite => "Bit yourself".into(),
                        DeathCause::BoardFull => "The board is full!".into(),
                    };
                    self.new_best = session.finish(GameId::Snake, GameResult::scored(score));
                }
                SnakeEvent::Paused | SnakeEvent::Resumed => {}
            }
        }
    }

    fn field_lines(&self) -> Vec<Line<'static>> {
        let head = self.game.head();
        let body: Vec<Point> = self.game.body().collect();
        let food = self.game.food();

        (0..FIELD_SIZE)
            .map(|y| {
                let spans: Vec<Span> = (0..FIELD_SIZE)
                    .map(|x| {
                        let p = Point::new(x, y);
                        if head == Some(p) {
                            Span::styled(BLOCK_CHAR, Style::default().fg(Color::LightGreen))
                        } else if body.contains(&p) {
                            Span::styled(BLOCK_CHAR, Style::default().fg(Color::Green))
                        } else if food == Some(p) {
                            Span::styled("()", Style::default().fg(Color::Red))
                        } else {
                            Span::raw(EMPTY_CHAR)
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Screen for SnakeScreen {
    fn render(&self, frame: &mut Frame, session: &Session) {
        let (body, status, hints) = split_screen(frame.size());
        let field_width = FIELD_SIZE as u16 * 2 + 2;
        let field_height = FIELD_SIZE as u16 + 2;
        let info_width = 16;
        let area = centered_rect(field_width + info_width, field_height, body);

        let columns = Layout::horizontal([
            Constraint::Length(field_width),
            Constraint::Length(info_width),
        ])
        .split(area);

        let field = Paragraph::new(self.field_lines()).block(titled_block(" Snake "));
        frame.render_widget(field, columns[0]);

        let best = session
            .records
            .stats(GameId::Snake)
            .best_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        render_info(
            frame,
            " Info ",
            &[
                ("Score", self.game.score().to_string()),
                ("Best", best),
                ("Length", self.game.len().to_string()),
                ("Speed", self.game.speed_level().to_string()),
                ("Mode", self.game.difficulty().name().to_string()),
            ],
            columns[1],
        );

        render_status(frame, &self.status, status);
        render_hints(frame, "Arrows/WASD: Turn | P: Pause | ESC: Menu", hints);

        match self.game.phase() {
            Phase::Paused => render_popup(
                frame,
                " Paused ",
                ("PAUSED", Color::Yellow),
                &["Press P to continue".into()],
            ),
            Phase::Over => {
                let mut body = vec![format!("Score: {}", self.game.score())];
                if self.new_best {
                    body.push("New best score!".into());
                }
                body.push(String::new());
                body.push(format!("D: difficulty ({})", self.game.difficulty().name()));
                body.push("Enter: play again | ESC: menu".into());
                render_popup(frame, " Game Over ", ("GAME OVER", Color::Red), &body);
            }
            Phase::Idle | Phase::Running => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Transition::Leave,
            KeyCode::Char('p') | KeyCode::Char('P') => {
                let result = match self.game.phase() {
                    Phase::Paused => self.game.resume(),
                    _ => self.game.pause(),
                };
                if result.is_ok() {
                    self.last_step = Instant::now();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') if self.game.phase() == Phase::Over => {
                self.restart(session);
            }
            KeyCode::Char('d') | KeyCode::Char('D') if self.game.phase() == Phase::Over => {
                self.cycle_difficulty();
            }
            _ => {
                let direction = match key {
                    KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Direction::Up),
                    KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Some(Direction::Down),
                    KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Some(Direction::Left),
                    KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Some(Direction::Right),
                    _ => None,
                };
                if let Some(direction) = direction {
                    // Reversals are ignored.
                    let _ = self.game.turn(direction);
                }
            }
        }
        self.drain_events(session);
        Transition::Stay
    }

    fn update(&mut self, session: &mut Session) {
        if self.game.phase() != Phase::Running {
            return;
        }
        if self.last_step.elapsed() >= Duration::from_millis(self.game.interval_ms()) {
            let _ = self.game.step();
            self.last_step = Instant::now();
            self.drain_events(session);
        }
    }

    fn poll_timeout(&self) -> Duration {
        if self.game.phase() != Phase::Running {
            return IDLE_POLL;
        }
        Duration::from_millis(self.game.interval_ms())
            .checked_sub(self.last_step.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}
