use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::tetris::{
    Cell, Tetris, TetrisEvent, TetrisState, Tetromino, TetrominoType, BOARD_HEIGHT, BOARD_WIDTH,
};
use arcade::GameId;

use super::session::{GameResult, Session};
use super::widgets::{
    centered_rect, render_hints, render_info, render_popup, render_status, split_screen,
    titled_block, BLOCK_CHAR, EMPTY_CHAR,
};
use super::{Screen, Transition};

const CELL_WIDTH: u16 = 2;
const GHOST_CHAR: &str = "░░";

fn tetromino_color(t: TetrominoType) -> Color {
    match t {
        TetrominoType::I => Color::Cyan,
        TetrominoType::O => Color::Yellow,
        TetrominoType::T => Color::Magenta,
        TetrominoType::S => Color::Green,
        TetrominoType::Z => Color::Red,
        TetrominoType::J => Color::Blue,
        TetrominoType::L => Color::Rgb(255, 165, 0),
    }
}

pub struct TetrisScreen {
    game: Tetris,
    last_tick: Instant,
    status: String,
    new_best: bool,
}

impl TetrisScreen {
    pub fn new(session: &mut Session) -> Self {
        let mut game = Tetris::new(session.config.tetris);
        game.start();
        session.begin(GameId::Tetris);
        let mut screen = Self {
            game,
            last_tick: Instant::now(),
            status: String::new(),
            new_best: false,
        };
        screen.drain_events(session);
        screen
    }

    fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.game.drop_interval_ms())
    }

    fn drain_events(&mut self, session: &mut Session) {
        for event in self.game.take_events() {
            match event {
                TetrisEvent::GameStarted => self.status = "Good luck!".into(),
                TetrisEvent::LinesCleared(n) => {
                    self.status = match n {
                        4 => "Tetris!".into(),
                        1 => "1 line".into(),
                        n => format!("{n} lines"),
                    }
                }
                TetrisEvent::LevelUp(level) => self.status = format!("Level {level}"),
                TetrisEvent::GameOver { score, .. } => {
                    self.new_best = session.finish(GameId::Tetris, GameResult::scored(score));
                }
                TetrisEvent::HardDropped(_)
                | TetrisEvent::PieceMoved
                | TetrisEvent::PieceRotated
                | TetrisEvent::PieceLocked
                | TetrisEvent::Paused
                | TetrisEvent::Resumed => {}
            }
        }
    }

    fn render_board(&self, frame: &mut Frame, area: Rect) {
        let block = titled_block(" Tetris ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visual = self.game.render_grid();
        let ghost: Vec<(i16, i16)> = if self.game.ghost_enabled() {
            self.game
                .ghost()
                .blocks()
                .iter()
                .map(|b| (b.x, b.y))
                .collect()
        } else {
            Vec::new()
        };

        let lines: Vec<Line> = visual
            .rows()
            .enumerate()
            .map(|(y, row)| {
                let spans: Vec<Span> = row
                    .iter()
                    .enumerate()
                    .map(|(x, cell)| match cell {
                        Cell::Locked(kind) => {
                            Span::styled(BLOCK_CHAR, Style::default().fg(tetromino_color(*kind)))
                        }
                        Cell::Empty if ghost.contains(&(x as i16, y as i16)) => Span::styled(
                            GHOST_CHAR,
                            Style::default().fg(tetromino_color(self.game.current_piece().kind)),
                        ),
                        Cell::Empty => Span::raw(EMPTY_CHAR),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let block = titled_block(" Next ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(piece_lines(self.game.next_piece())), inner);
    }
}

fn piece_lines(piece: &Tetromino) -> Vec<Line<'static>> {
    let color = tetromino_color(piece.kind);
    piece
        .shape
        .rows()
        .filter(|row| row.iter().any(|&c| c))
        .map(|row| {
            let mut spans = vec![Span::raw(" ")];
            spans.extend(row.iter().map(|&filled| {
                if filled {
                    Span::styled(BLOCK_CHAR, Style::default().fg(color))
                } else {
                    Span::raw(EMPTY_CHAR)
                }
            }));
            Line::from(spans)
        })
        .collect()
}

impl Screen for TetrisScreen {
    fn render(&self, frame: &mut Frame, session: &Session) {
        let (body, status, hints) = split_screen(frame.size());

        let grid_width = BOARD_WIDTH as u16 * CELL_WIDTH + 2;
        let grid_height = BOARD_HEIGHT as u16 + 2;
        let side_width = 14;
        let area = centered_rect(grid_width + side_width * 2, grid_height, body);

        let columns = Layout::horizontal([
            Constraint::Length(grid_width),
            Constraint::Length(side_width),
            Constraint::Length(side_width),
        ])
        .split(area);

        self.render_board(frame, columns[0]);

        let side = Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).split(columns[1]);
        self.render_preview(frame, side[0]);

        let best = session
            .records
            .stats(GameId::Tetris)
            .best_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        render_info(
            frame,
            " Info ",
            &[
                ("Score", self.game.score().to_string()),
                ("Lines", self.game.lines_cleared().to_string()),
                ("Level", self.game.level().to_string()),
                ("Best", best),
            ],
            columns[2],
        );

        render_status(frame, &self.status, status);
        render_hints(
            frame,
            "A/D: Move | S: Soft drop | W: Hard drop | ↑: Rotate | G: Ghost | P: Pause | ESC: Menu",
            hints,
        );

        match self.game.state() {
            TetrisState::Paused => render_popup(
                frame,
                " Paused ",
                ("PAUSED", Color::Yellow),
                &["Press P to continue".into(), "Press ESC for menu".into()],
            ),
            TetrisState::Over => {
                let mut body = vec![
                    format!("Score: {}", self.game.score()),
                    format!("Lines: {}", self.game.lines_cleared()),
                    format!("Level: {}", self.game.level()),
                ];
                if self.new_best {
                    body.push("New best score!".into());
                }
                body.push(String::new());
                body.push("Enter: play again | ESC: menu".into());
                render_popup(frame, " Game Over ", ("GAME OVER", Color::Red), &body);
            }
            TetrisState::Idle | TetrisState::Running => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Transition::Leave,
            KeyCode::Char('p') | KeyCode::Char('P') => {
                let _ = self.game.toggle_pause();
                self.last_tick = Instant::now();
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                let shown = self.game.toggle_ghost();
                self.status = if shown { "Ghost on" } else { "Ghost off" }.into();
            }
            KeyCode::Enter | KeyCode::Char('r') if self.game.is_game_over() => {
                self.game.start();
                session.begin(GameId::Tetris);
                self.new_best = false;
                self.last_tick = Instant::now();
            }
            _ if self.game.state() == TetrisState::Running => {
                // Blocked moves are simply ignored.
                let _ = match key {
                    KeyCode::Char('a') | KeyCode::Char('h') | KeyCode::Left => {
                        self.game.move_piece(-1, 0).map(drop)
                    }
                    KeyCode::Char('d') | KeyCode::Char('l') | KeyCode::Right => {
                        self.game.move_piece(1, 0).map(drop)
                    }
                    KeyCode::Char('s') | KeyCode::Char('j') | KeyCode::Down => {
                        self.game.move_piece(0, 1).map(drop)
                    }
                    KeyCode::Char('w') | KeyCode::Char(' ') => self.game.hard_drop().map(drop),
                    KeyCode::Up | KeyCode::Char('k') => self.game.rotate(),
                    _ => Ok(()),
                };
            }
            _ => {}
        }
        self.drain_events(session);
        Transition::Stay
    }

    fn update(&mut self, session: &mut Session) {
        if self.game.state() != TetrisState::Running {
            return;
        }
        if self.last_tick.elapsed() >= self.tick_duration() {
            let _ = self.game.tick();
            self.last_tick = Instant::now();
            self.drain_events(session);
        }
    }

    fn poll_timeout(&self) -> Duration {
        if self.game.state() != TetrisState::Running {
            return super::IDLE_POLL;
        }
        self.tick_duration()
            .checked_sub(self.last_tick.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}
