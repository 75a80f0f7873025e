//! Rejection reasons reported by the engines.
//!
//! None of these are faults: a rejected command leaves the engine exactly as
//! it was and the host is free to retry.

use thiserror::Error;

use crate::go::Stone;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GoError {
    #[error("no game in progress")]
    InvalidPhase,
    #[error("it is {expected:?}'s turn")]
    WrongPlayer { expected: Stone },
    #[error("position is off the board")]
    OutOfBounds,
    #[error("position already occupied")]
    Occupied,
    #[error("move would leave its own group without liberties")]
    Suicide,
    #[error("move would recreate the previous board position")]
    Ko,
    #[error("handicap can only change before the game starts")]
    HandicapLocked,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TetrisError {
    #[error("game is not running")]
    InvalidPhase,
    #[error("piece cannot move there")]
    Blocked,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Game2048Error {
    #[error("game is not running")]
    InvalidPhase,
    #[error("no tile can move in that direction")]
    NoChange,
    #[error("no undo available")]
    NothingToUndo,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnakeError {
    #[error("game is not running")]
    InvalidPhase,
    #[error("snake cannot reverse onto itself")]
    Reversal,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("game is not running")]
    InvalidPhase,
    #[error("no card at index {0}")]
    OutOfBounds(usize),
    #[error("card is already face up")]
    AlreadyRevealed,
    #[error("a mismatched pair is still face up")]
    AwaitingConceal,
    #[error("no hints left")]
    NoHints,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BattleshipError {
    #[error("command not valid in the current phase")]
    InvalidPhase,
    #[error("it is not the player's turn")]
    NotYourTurn,
    #[error("target is off the grid")]
    OutOfBounds,
    #[error("that cell was already targeted")]
    AlreadyTargeted,
    #[error("ship does not fit there")]
    CannotPlace,
    #[error("fleet is not fully deployed")]
    FleetIncomplete,
}

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("records file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("records file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
