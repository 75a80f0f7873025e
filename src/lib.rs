//! Rules engines for a small terminal arcade.
//!
//! Every engine is a synchronous state machine: commands either commit a
//! new consistent state or return an error and leave the engine untouched.
//! Engines never render, sleep or touch the filesystem; the binary shell
//! drives them and persists [`records`].

pub mod battleship;
pub mod config;
pub mod error;
pub mod game2048;
pub mod go;
pub mod grid;
pub mod memory;
pub mod records;
pub mod snake;
pub mod tetris;

pub use config::ArcadeConfig;
pub use error::{
    BattleshipError, Game2048Error, GoError, MemoryError, RecordsError, SnakeError, TetrisError,
};
pub use grid::{Grid, Point};
pub use records::{GameId, Records};
