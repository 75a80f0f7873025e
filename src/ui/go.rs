use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::go::{BoardSize, Cell, GoEvent, GoGame, GoPhase, Stone, MAX_HANDICAP};
use arcade::{GameId, GoError, Point};

use super::session::{GameResult, Session};
use super::widgets::{
    centered_rect, render_hints, render_info, render_popup, render_status, split_screen,
    titled_block,
};
use super::{Screen, Transition};

const SIZES: [BoardSize; 3] = [BoardSize::Nine, BoardSize::Thirteen, BoardSize::Nineteen];

pub struct GoScreen {
    game: GoGame,
    cursor: Point,
    status: String,
}

impl GoScreen {
    pub fn new(session: &mut Session) -> Self {
        let game = GoGame::new(session.config.go);
        let center = game.size() / 2;
        Self {
            game,
            cursor: Point::new(center, center),
            status: "S: board size | H: handicap | Enter: start".into(),
        }
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        if let Some(p) = self.cursor.offset(dx, dy) {
            if p.x < self.game.size() && p.y < self.game.size() {
                self.cursor = p;
            }
        }
    }

    fn recenter(&mut self) {
        let center = self.game.size() / 2;
        self.cursor = Point::new(center, center);
    }

    fn handle_setup(&mut self, key: KeyCode, session: &mut Session) {
        let config = self.game.config();
        match key {
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let i = SIZES.iter().position(|&s| s == config.size).unwrap_or(0);
                let _ = self.game.set_board_size(SIZES[(i + 1) % SIZES.len()]);
                self.recenter();
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                let _ = self.game.set_handicap((config.handicap + 1) % (MAX_HANDICAP + 1));
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.game.start();
                self.recenter();
                session.begin(GameId::Go);
            }
            _ => {}
        }
    }

    fn drain_events(&mut self, session: &mut Session) {
        for event in self.game.take_events() {
            self.status = match event {
                GoEvent::GameStarted { size, handicap } => format!(
                    "{0}×{0} game, {handicap} handicap. Black to play",
                    size.dimension()
                ),
                GoEvent::StonePlaced { stone, .. } => {
                    format!("{} to play", stone.opponent().name())
                }
                GoEvent::StonesCaptured { color, points } => {
                    format!("{} captured {} stone(s)", color.opponent().name(), points.len())
                }
                GoEvent::MoveRejected { reason, .. } => rejection(reason).to_string(),
                GoEvent::Passed(stone) => format!("{} passes", stone.name()),
                GoEvent::Resigned(stone) => format!("{} resigns", stone.name()),
                GoEvent::GameOver(outcome) => {
                    session.finish(GameId::Go, GameResult::default());
                    outcome.to_string()
                }
            };
        }
    }

    fn board_lines(&self) -> Vec<Line<'static>> {
        let board = self.game.board();
        let size = self.game.size();
        let stars = self.game.config().size.star_points();
        let territory = (self.game.phase() == GoPhase::Finished).then(|| self.game.territory());
        let ko = self.game.ko_point();

        (0..size)
            .map(|y| {
                let spans: Vec<Span> = (0..size)
                    .map(|x| {
                        let p = Point::new(x, y);
                        let (symbol, mut style) = match board.get(p) {
                            Some(Cell::Black) => ("● ", Style::default().fg(Color::Black).bg(Color::Yellow)),
                            Some(Cell::White) => ("● ", Style::default().fg(Color::White).bg(Color::Yellow)),
                            _ => {
                                let owner = territory.as_ref().and_then(|t| t.owners.get(p).flatten());
                                let symbol = match owner {
                                    Some(Stone::Black) => "x ",
                                    Some(Stone::White) => "o ",
                                    None if ko == Some(p) => "□ ",
                                    None if stars.contains(&p) => "+ ",
                                    None => "· ",
                                };
                                (symbol, Style::default().fg(Color::DarkGray).bg(Color::Yellow))
                            }
                        };
                        if p == self.cursor && self.game.phase() == GoPhase::InProgress {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Span::styled(symbol, style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn rejection(reason: GoError) -> &'static str {
    match reason {
        GoError::Occupied => "That point is occupied",
        GoError::Suicide => "Suicide is not allowed",
        GoError::Ko => "Ko: that would repeat the previous position",
        GoError::OutOfBounds => "Off the board",
        GoError::WrongPlayer { .. } => "Not your turn",
        GoError::InvalidPhase | GoError::HandicapLocked => "No game in progress",
    }
}

impl Screen for GoScreen {
    fn render(&self, frame: &mut Frame, _session: &Session) {
        let (body, status, hints) = split_screen(frame.size());
        let size = self.game.size() as u16;
        let board_width = size * 2 + 2;
        let info_width = 18;
        let area = centered_rect(board_width + info_width, size + 2, body);

        let columns = Layout::horizontal([
            Constraint::Length(board_width),
            Constraint::Length(info_width),
        ])
        .split(area);

        let board = Paragraph::new(self.board_lines()).block(titled_block(" Go "));
        frame.render_widget(board, columns[0]);

        let config = self.game.config();
        let captures = self.game.captures();
        render_info(
            frame,
            " Info ",
            &[
                ("To move", self.game.to_move().name().to_string()),
                ("Captures B/W", format!("{} / {}", captures.black, captures.white)),
                ("Handicap", config.handicap.to_string()),
                ("Komi", format!("{:.1}", config.komi)),
                ("Moves", self.game.move_count().to_string()),
            ],
            columns[1],
        );

        render_status(frame, &self.status, status);
        let keys = match self.game.phase() {
            GoPhase::Setup => "S: Size | H: Handicap | Enter: Start | ESC: Menu",
            GoPhase::InProgress => "Arrows: Move | Enter: Place | P: Pass | R: Resign | ESC: Menu",
            GoPhase::Finished => "Enter: New game | ESC: Menu",
        };
        render_hints(frame, keys, hints);

        if let (GoPhase::Finished, Some(outcome)) = (self.game.phase(), self.game.outcome()) {
            let score = self.game.score();
            render_popup(
                frame,
                " Game Over ",
                (&outcome.to_string(), Color::Green),
                &[
                    format!("Black: {:.1}", score.black_total()),
                    format!("White: {:.1}", score.white_total()),
                    String::new(),
                    "Enter: new game | ESC: menu".into(),
                ],
            );
        }
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q')) {
            return Transition::Leave;
        }
        match self.game.phase() {
            GoPhase::Setup => self.handle_setup(key, session),
            GoPhase::Finished => {
                if matches!(key, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.game = GoGame::new(self.game.config());
                    self.status = "S: board size | H: handicap | Enter: start".into();
                }
            }
            GoPhase::InProgress => match key {
                KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
                KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
                KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
                KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let _ = self.game.play(self.cursor);
                }
                KeyCode::Char('p') | KeyCode::Char('P') => {
                    let _ = self.game.pass();
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    let _ = self.game.resign();
                }
                _ => {}
            },
        }
        self.drain_events(session);
        Transition::Stay
    }
}
