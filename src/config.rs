//! Arcade settings read from the environment.
//!
//! Unset or unparsable variables fall back to the defaults; numeric values
//! are clamped into the range each engine accepts.

use std::env;
use std::path::PathBuf;

use crate::game2048;
use crate::go::{BoardSize, GoConfig, DEFAULT_KOMI, MAX_HANDICAP};
use crate::memory;
use crate::snake;
use crate::tetris::{TetrisConfig, MAX_START_LEVEL};

pub const DEFAULT_RECORDS_PATH: &str = "arcade_records.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ArcadeConfig {
    pub records_path: PathBuf,
    pub go: GoConfig,
    pub tetris: TetrisConfig,
    pub game2048_size: usize,
    pub snake_difficulty: snake::Difficulty,
    pub memory_difficulty: memory::Difficulty,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            go: GoConfig::default(),
            tetris: TetrisConfig::default(),
            game2048_size: game2048::DEFAULT_SIZE,
            snake_difficulty: snake::Difficulty::default(),
            memory_difficulty: memory::Difficulty::default(),
        }
    }
}

impl ArcadeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let records_path = env::var("ARCADE_RECORDS_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.records_path);

        let size = parsed::<usize>("ARCADE_GO_BOARD_SIZE")
            .and_then(BoardSize::from_dimension)
            .unwrap_or(defaults.go.size);
        let handicap = parsed::<usize>("ARCADE_GO_HANDICAP")
            .map(|h| h.min(MAX_HANDICAP))
            .unwrap_or(defaults.go.handicap);
        let komi = parsed::<f32>("ARCADE_GO_KOMI")
            .filter(|k| k.is_finite())
            .unwrap_or(DEFAULT_KOMI);

        let start_level = parsed::<u32>("ARCADE_TETRIS_START_LEVEL")
            .map(|l| l.clamp(1, MAX_START_LEVEL))
            .unwrap_or(defaults.tetris.start_level);

        let game2048_size = parsed::<usize>("ARCADE_2048_SIZE")
            .map(|s| s.clamp(game2048::MIN_SIZE, game2048::MAX_SIZE))
            .unwrap_or(defaults.game2048_size);

        let snake_difficulty = env::var("ARCADE_SNAKE_DIFFICULTY")
            .ok()
            .and_then(|s| snake::Difficulty::from_name(&s))
            .unwrap_or(defaults.snake_difficulty);

        let memory_difficulty = env::var("ARCADE_MEMORY_DIFFICULTY")
            .ok()
            .and_then(|s| memory::Difficulty::from_name(&s))
            .unwrap_or(defaults.memory_difficulty);

        Self {
            records_path,
            go: GoConfig {
                size,
                handicap,
                komi,
            },
            tetris: TetrisConfig { start_level },
            game2048_size,
            snake_difficulty,
            memory_difficulty,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
