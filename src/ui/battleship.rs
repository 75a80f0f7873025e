use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use arcade::battleship::{
    ship_cells, BattleshipEvent, BattleshipGame, Mark, Ocean, Orientation, Phase, Shot, ShipKind,
    Side, GRID_SIZE,
};
use arcade::{BattleshipError, GameId, Point};

use super::session::{GameResult, Session};
use super::widgets::{
    centered_rect, render_hints, render_info, render_popup, render_status, split_screen,
    titled_block,
};
use super::{Screen, Transition, IDLE_POLL};

const ENEMY_DELAY: Duration = Duration::from_millis(800);

pub struct BattleshipScreen {
    game: BattleshipGame,
    cursor: Point,
    selected: ShipKind,
    orientation: Orientation,
    enemy_due: Option<Instant>,
    status: String,
}

impl BattleshipScreen {
    pub fn new(_session: &mut Session) -> Self {
        Self {
            game: BattleshipGame::new(),
            cursor: Point::new(0, 0),
            selected: ShipKind::Carrier,
            orientation: Orientation::Horizontal,
            enemy_due: None,
            status: "Deploy your fleet".into(),
        }
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        if let Some(p) = self.cursor.offset(dx, dy) {
            if p.x < GRID_SIZE && p.y < GRID_SIZE {
                self.cursor = p;
            }
        }
    }

    /// Next ship in fleet order that is not yet deployed, if any.
    fn next_unplaced(&self) -> Option<ShipKind> {
        let ocean = self.game.player_ocean();
        let start = ShipKind::ALL
            .iter()
            .position(|&k| k == self.selected)
            .unwrap_or(0);
        (1..=ShipKind::ALL.len())
            .map(|i| ShipKind::ALL[(start + i) % ShipKind::ALL.len()])
            .find(|&k| ocean.ship(k).is_none())
    }

    fn handle_setup(&mut self, key: KeyCode, session: &mut Session) -> Result<(), BattleshipError> {
        match key {
            KeyCode::Tab => {
                let i = ShipKind::ALL.iter().position(|&k| k == self.selected).unwrap_or(0);
                self.selected = ShipKind::ALL[(i + 1) % ShipKind::ALL.len()];
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.orientation = self.orientation.flipped(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.game.place_ship(self.selected, self.cursor, self.orientation)?;
                self.status = format!("{} deployed", self.selected.name());
                if let Some(next) = self.next_unplaced() {
                    self.selected = next;
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.game.random_placement()?;
                self.status = "Fleet deployed at random".into();
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.game.clear_ships()?;
                self.selected = ShipKind::Carrier;
                self.status = "Fleet cleared".into();
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.game.start_battle()?;
                session.begin(GameId::Battleship);
            }
            _ => {}
        }
        Ok(())
    }

    fn drain_events(&mut self, session: &mut Session) {
        for event in self.game.take_events() {
            match event {
                BattleshipEvent::BattleStarted => {
                    self.cursor = Point::new(0, 0);
                    self.status = format!("Fire! {} shots", self.game.shots_left());
                }
                BattleshipEvent::Fired { side, shot, .. } => {
                    self.status = match (side, shot) {
                        (Side::Player, Shot::Miss) => "Miss".into(),
                        (Side::Player, Shot::Hit(_)) => "Hit!".into(),
                        (Side::Player, Shot::Sunk(kind)) => format!("You sank their {}!", kind.name()),
                        (Side::Enemy, Shot::Sunk(kind)) => format!("They sank your {}!", kind.name()),
                        (Side::Enemy, _) => self.status.clone(),
                    };
                }
                BattleshipEvent::TurnChanged { side: Side::Enemy, shots } => {
                    self.status = format!("Enemy fires {shots} shots...");
                    self.enemy_due = Some(Instant::now() + ENEMY_DELAY);
                }
                BattleshipEvent::TurnChanged { side: Side::Player, shots } => {
                    self.status = format!("Your turn: {shots} shots");
                }
                BattleshipEvent::GameOver { winner } => {
                    let won = winner == Side::Player;
                    session.finish(GameId::Battleship, GameResult::decided(won));
                    self.enemy_due = None;
                }
            }
        }
    }

    fn ocean_lines(&self, ocean: &Ocean, reveal: bool, cursor: bool) -> Vec<Line<'static>> {
        let preview = if self.game.phase() == Phase::Setup && cursor {
            ship_cells(self.selected, self.cursor, self.orientation).unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut lines = vec![Line::from(
            std::iter::once(Span::raw("  "))
                .chain((0..GRID_SIZE).map(|x| Span::raw(format!("{} ", (b'A' + x as u8) as char))))
                .collect::<Vec<_>>(),
        )];

        for y in 0..GRID_SIZE {
            let mut spans = vec![Span::raw(format!("{:>2}", y + 1))];
            for x in 0..GRID_SIZE {
                let p = Point::new(x, y);
                let ship = ocean.ship_at(p);
                let (symbol, mut style) = match (ocean.mark(p), ship) {
                    (Mark::Hit, _) if ocean.is_sunk_at(p) => ("##", Style::default().fg(Color::DarkGray).bg(Color::Red)),
                    (Mark::Hit, _) => ("XX", Style::default().fg(Color::Red)),
                    (Mark::Miss, _) => ("··", Style::default().fg(Color::Blue)),
                    (Mark::Untried, Some(_)) if reveal => ("██", Style::default().fg(Color::Gray)),
                    (Mark::Untried, _) => ("~~", Style::default().fg(Color::Blue)),
                };
                if preview.contains(&p) {
                    style = style.bg(Color::Green);
                }
                if cursor && p == self.cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                spans.push(Span::styled(symbol, style));
            }
            lines.push(Line::from(spans));
        }
        lines
    }

    fn fleet_rows(&self) -> Vec<(&'static str, String)> {
        let ocean = self.game.player_ocean();
        ShipKind::ALL
            .iter()
            .map(|&kind| {
                let state = match ocean.ship(kind) {
                    None if kind == self.selected => "> pending".to_string(),
                    None => "pending".to_string(),
                    Some(ship) if ship.is_sunk() => "sunk".to_string(),
                    Some(ship) => format!("{}/{}", kind.len() - ship.hits, kind.len()),
                };
                (kind.name(), state)
            })
            .collect()
    }
}

impl Screen for BattleshipScreen {
    fn render(&self, frame: &mut Frame, session: &Session) {
        let (body, status, hints) = split_screen(frame.size());
        let grid_width = GRID_SIZE as u16 * 2 + 4;
        let grid_height = GRID_SIZE as u16 + 3;
        let info_width = 18;
        let area = centered_rect(grid_width * 2 + info_width, grid_height.max(18), body);

        let columns = Layout::horizontal([
            Constraint::Length(grid_width),
            Constraint::Length(grid_width),
            Constraint::Length(info_width),
        ])
        .split(area);

        let setup = self.game.phase() == Phase::Setup;
        let over = self.game.phase() == Phase::Over;

        let own = Paragraph::new(self.ocean_lines(self.game.player_ocean(), true, setup))
            .block(titled_block(" Your fleet "));
        frame.render_widget(own, columns[0]);

        let enemy = Paragraph::new(self.ocean_lines(self.game.enemy_ocean(), over, !setup && !over))
            .block(titled_block(" Enemy waters "));
        frame.render_widget(enemy, columns[1]);

        let mut rows = self.fleet_rows();
        if !setup {
            let ours = self.game.player_stats();
            let theirs = self.game.enemy_stats();
            rows = vec![
                ("Shots left", self.game.shots_left().to_string()),
                ("Your hits", format!("{} ({}%)", ours.hits, ours.accuracy())),
                ("Your misses", ours.misses.to_string()),
                ("Enemy hits", theirs.hits.to_string()),
                ("Enemy afloat", self.game.enemy_ocean().afloat().to_string()),
            ];
        }
        let record = session.records.stats(GameId::Battleship);
        rows.push(("Record", format!("{}W {}L", record.wins, record.losses)));
        render_info(frame, " Fleet ", &rows, columns[2]);

        render_status(frame, &self.status, status);
        let keys = match self.game.phase() {
            Phase::Setup => "Arrows: Move | Tab: Ship | R: Rotate | Enter: Place | X: Random | C: Clear | B: Battle",
            Phase::Battle => "Arrows: Aim | Enter: Fire | ESC: Menu",
            Phase::Over => "Enter: New game | ESC: Menu",
        };
        render_hints(frame, keys, hints);

        if let Some(winner) = self.game.winner() {
            let (heading, color) = match winner {
                Side::Player => ("VICTORY", Color::Green),
                Side::Enemy => ("DEFEAT", Color::Red),
            };
            let ours = self.game.player_stats();
            render_popup(
                frame,
                " Game Over ",
                (heading, color),
                &[
                    format!("Shots fired: {}", ours.shots()),
                    format!("Accuracy: {}%", ours.accuracy()),
                    String::new(),
                    "Enter: new game | ESC: menu".into(),
                ],
            );
        }
    }

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Transition::Leave,
            KeyCode::Up | KeyCode::Char('w') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('s') => self.move_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('a') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('d') => self.move_cursor(1, 0),
            _ => {
                let result = match self.game.phase() {
                    Phase::Setup => self.handle_setup(key, session),
                    Phase::Battle if matches!(key, KeyCode::Enter | KeyCode::Char(' ')) => {
                        self.game.fire(self.cursor).map(drop)
                    }
                    Phase::Over if key == KeyCode::Enter => {
                        self.game.reset();
                        self.selected = ShipKind::Carrier;
                        self.status = "Deploy your fleet".into();
                        Ok(())
                    }
                    Phase::Battle | Phase::Over => Ok(()),
                };
                if let Err(e) = result {
                    self.status = e.to_string();
                }
            }
        }
        self.drain_events(session);
        Transition::Stay
    }

    fn update(&mut self, session: &mut Session) {
        if self.enemy_due.is_some_and(|due| Instant::now() >= due) {
            self.enemy_due = None;
            if let Err(e) = self.game.enemy_turn() {
                session.note(format!("enemy turn rejected: {e}"));
            }
            self.drain_events(session);
        }
    }

    fn poll_timeout(&self) -> Duration {
        match self.enemy_due {
            Some(due) => due.saturating_duration_since(Instant::now()),
            None => IDLE_POLL,
        }
    }
}
