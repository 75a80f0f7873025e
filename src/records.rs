//! Persistent per-game statistics, stored as pretty-printed JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecordsError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Battleship,
    Snake,
    Tetris,
    Memory,
    #[serde(rename = "2048")]
    Game2048,
    Go,
}

impl GameId {
    pub const ALL: [GameId; 6] = [
        GameId::Battleship,
        GameId::Snake,
        GameId::Tetris,
        GameId::Memory,
        GameId::Game2048,
        GameId::Go,
    ];

    pub fn title(self) -> &'static str {
        match self {
            GameId::Battleship => "Battleship",
            GameId::Snake => "Snake",
            GameId::Tetris => "Tetris",
            GameId::Memory => "Memory",
            GameId::Game2048 => "2048",
            GameId::Go => "Go",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub played: u32,
    pub best_score: Option<u32>,
    pub best_time_ms: Option<u64>,
    pub wins: u32,
    pub losses: u32,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Records {
    games: BTreeMap<GameId, GameStats>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read records from `path`. A missing file yields empty records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordsError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn stats(&self, game: GameId) -> GameStats {
        self.games.get(&game).copied().unwrap_or_default()
    }

    fn entry(&mut self, game: GameId) -> &mut GameStats {
        self.games.entry(game).or_default()
    }

    pub fn record_play(&mut self, game: GameId) {
        self.entry(game).played += 1;
    }

    /// Returns `true` when `score` is a new best.
    pub fn submit_score(&mut self, game: GameId, score: u32) -> bool {
        let stats = self.entry(game);
        if stats.best_score.map_or(true, |best| score > best) {
            stats.best_score = Some(score);
            true
        } else {
            false
        }
    }

    /// Returns `true` when `ms` is a new fastest time.
    pub fn submit_time(&mut self, game: GameId, ms: u64) -> bool {
        let stats = self.entry(game);
        if stats.best_time_ms.map_or(true, |best| ms < best) {
            stats.best_time_ms = Some(ms);
            true
        } else {
            false
        }
    }

    pub fn record_result(&mut self, game: GameId, won: bool) {
        let stats = self.entry(game);
        if won {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
    }

    pub fn total_played(&self) -> u32 {
        self.games.values().map(|s| s.played).sum()
    }

    /// Most played game; ties go to the earlier game in [`GameId::ALL`].
    pub fn favorite(&self) -> Option<GameId> {
        GameId::ALL
            .into_iter()
            .map(|g| (g, self.stats(g).played))
            .filter(|&(_, played)| played > 0)
            .fold(None, |best: Option<(GameId, u32)>, (g, played)| match best {
                Some((_, top)) if top >= played => best,
                _ => Some((g, played)),
            })
            .map(|(g, _)| g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_ids_serialize_to_stable_names() {
        let json = serde_json::to_string(&GameId::ALL).unwrap();
        assert_eq!(
            json,
            r#"["battleship","snake","tetris","memory","2048","go"]"#
        );
    }

    #[test]
    fn best_score_keeps_highest_and_best_time_keeps_lowest() {
        let mut r = Records::new();
        assert!(r.submit_score(GameId::Tetris, 500));
        assert!(!r.submit_score(GameId::Tetris, 300));
        assert!(r.submit_score(GameId::Tetris, 900));
        assert_eq!(r.stats(GameId::Tetris).best_score, Some(900));

        assert!(r.submit_time(GameId::Memory, 60_000));
        assert!(!r.submit_time(GameId::Memory, 61_000));
        assert!(r.submit_time(GameId::Memory, 42_000));
        assert_eq!(r.stats(GameId::Memory).best_time_ms, Some(42_000));
    }

    #[test]
    fn favorite_is_most_played_with_stable_ties() {
        let mut r = Records::new();
        assert_eq!(r.favorite(), None);
        r.record_play(GameId::Go);
        r.record_play(GameId::Snake);
        assert_eq!(r.favorite(), Some(GameId::Snake));
        r.record_play(GameId::Go);
        assert_eq!(r.favorite(), Some(GameId::Go));
        assert_eq!(r.total_played(), 3);
    }
}
