use arcade::{ArcadeConfig, GameId, Records};

/// How a finished game should be written to the records.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameResult {
    pub score: Option<u32>,
    pub time_ms: Option<u64>,
    pub won: Option<bool>,
}

impl GameResult {
    pub fn scored(score: u32) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    pub fn timed(ms: u64) -> Self {
        Self {
            time_ms: Some(ms),
            ..Self::default()
        }
    }

    pub fn decided(won: bool) -> Self {
        Self {
            won: Some(won),
            ..Self::default()
        }
    }
}

/// State shared by every screen: configuration, records and the
/// diagnostics printed once the terminal is restored.
pub struct Session {
    pub config: ArcadeConfig,
    pub records: Records,
    diagnostics: Vec<String>,
}

impl Session {
    pub fn new(config: ArcadeConfig) -> Self {
        let mut diagnostics = Vec::new();
        let records = match Records::load(&config.records_path) {
            Ok(records) => records,
            Err(e) => {
                diagnostics.push(format!(
                    "could not read {}: {e}; starting with empty records",
                    config.records_path.display()
                ));
                Records::new()
            }
        };
        Self {
            config,
            records,
            diagnostics,
        }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    pub fn begin(&mut self, game: GameId) {
        self.records.record_play(game);
        self.persist();
    }

    /// Store a finished game. Returns `true` on a new best score or time.
    pub fn finish(&mut self, game: GameId, result: GameResult) -> bool {
        let mut best = false;
        if let Some(score) = result.score {
            best |= self.records.submit_score(game, score);
        }
        if let Some(ms) = result.time_ms {
            best |= self.records.submit_time(game, ms);
        }
        if let Some(won) = result.won {
            self.records.record_result(game, won);
        }
        self.persist();
        best
    }

    fn persist(&mut self) {
        if let Err(e) = self.records.save(&self.config.records_path) {
            let path = self.config.records_path.display().to_string();
            self.note(format!("could not write {path}: {e}"));
        }
    }

    pub fn take_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }
}
