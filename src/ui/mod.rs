//! Terminal screens. Each screen owns one engine, turns key presses into
//! engine commands and drives the engine's timers.

use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::Frame;

use arcade::GameId;

mod battleship;
mod game2048;
mod go;
mod launcher;
mod memory;
mod session;
mod snake;
mod tetris;
mod widgets;

pub use launcher::{Launcher, LauncherAction};
pub use session::Session;

/// Poll timeout for screens without a running timer.
pub const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    Stay,
    Leave,
}

pub trait Screen {
    fn render(&self, frame: &mut Frame, session: &Session);

    fn handle_key(&mut self, key: KeyCode, session: &mut Session) -> Transition;

    /// Advance timers. Called once per loop iteration.
    fn update(&mut self, _session: &mut Session) {}

    /// Longest the loop may block waiting for input.
    fn poll_timeout(&self) -> Duration {
        IDLE_POLL
    }
}

pub fn open(game: GameId, session: &mut Session) -> Box<dyn Screen> {
    match game {
        GameId::Tetris => Box::new(tetris::TetrisScreen::new(session)),
        GameId::Go => Box::new(go::GoScreen::new(session)),
        GameId::Game2048 => Box::new(game2048::Game2048Screen::new(session)),
        GameId::Snake => Box::new(snake::SnakeScreen::new(session)),
        GameId::Memory => Box::new(memory::MemoryScreen::new(session)),
        GameId::Battleship => Box::new(battleship::BattleshipScreen::new(session)),
    }
}
