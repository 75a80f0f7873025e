//! Memory card matching.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::MemoryError;

pub const HINTS_PER_GAME: u32 = 3;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// `(rows, cols)` of the card layout.
    pub fn layout(self) -> (usize, usize) {
        match self {
            Difficulty::Easy => (3, 4),
            Difficulty::Medium => (4, 4),
            Difficulty::Hard => (4, 6),
            Difficulty::Expert => (6, 6),
        }
    }

    pub fn pairs(self) -> usize {
        let (rows, cols) = self.layout();
        rows * cols / 2
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn from_name(name: &str) -> Option<Difficulty> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Complete,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Face {
    #[default]
    Down,
    Up,
    Matched,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Card {
    pub symbol: u8,
    pub face: Face,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlipOutcome {
    /// First card of a pair is now face up.
    Revealed,
    Matched { completed: bool },
    /// Both cards stay face up until [`MemoryGame::conceal`].
    Mismatched,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MemoryEvent {
    Started { difficulty: Difficulty },
    Matched { pairs: usize },
    Mismatched,
    HintUsed { remaining: u32 },
    Paused,
    Resumed,
    Completed { moves: u32, elapsed_ms: u64 },
}

// ============================================================================
// Game
// ============================================================================

pub struct MemoryGame {
    difficulty: Difficulty,
    cards: Vec<Card>,
    /// Face-up cards that are not yet matched, in flip order.
    flipped: Vec<usize>,
    matched_pairs: usize,
    moves: u32,
    hints_left: u32,
    elapsed_ms: u64,
    phase: Phase,
    rng: StdRng,
    events: Vec<MemoryEvent>,
}

impl MemoryGame {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, rng: StdRng) -> Self {
        Self {
            difficulty,
            cards: Vec::new(),
            flipped: Vec::with_capacity(2),
            matched_pairs: 0,
            moves: 0,
            hints_left: HINTS_PER_GAME,
            elapsed_ms: 0,
            phase: Phase::Idle,
            rng,
            events: Vec::new(),
        }
    }

    /// A running game with a fixed deal of symbols.
    pub fn with_symbols(difficulty: Difficulty, symbols: &[u8]) -> Self {
        let mut game = Self::seeded(difficulty, 0);
        game.cards = symbols
            .iter()
            .map(|&symbol| Card {
                symbol,
                face: Face::Down,
            })
            .collect();
        game.phase = Phase::Running;
        game
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn start(&mut self) {
        let pairs = self.difficulty.pairs();
        let mut symbols: Vec<u8> = (0..pairs as u8).chain(0..pairs as u8).collect();
        symbols.shuffle(&mut self.rng);

        self.cards = symbols
            .into_iter()
            .map(|symbol| Card {
                symbol,
                face: Face::Down,
            })
            .collect();
        self.flipped.clear();
        self.matched_pairs = 0;
        self.moves = 0;
        self.hints_left = HINTS_PER_GAME;
        self.elapsed_ms = 0;
        self.phase = Phase::Running;
        self.events.clear();
        self.events.push(MemoryEvent::Started {
            difficulty: self.difficulty,
        });
    }

    /// Only takes effect from the next game.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if matches!(self.phase, Phase::Idle | Phase::Complete) {
            self.difficulty = difficulty;
        }
    }

    pub fn flip(&mut self, index: usize) -> Result<FlipOutcome, MemoryError> {
        if self.phase != Phase::Running {
            return Err(MemoryError::InvalidPhase);
        }
        if self.flipped.len() >= 2 {
            return Err(MemoryError::AwaitingConceal);
        }
        let card = self
            .cards
            .get_mut(index)
            .ok_or(MemoryError::OutOfBounds(index))?;
        if card.face != Face::Down {
            return Err(MemoryError::AlreadyRevealed);
        }
        card.face = Face::Up;
        self.flipped.push(index);

        let [a, b] = match self.flipped[..] {
            [a, b] => [a, b],
            _ => return Ok(FlipOutcome::Revealed),
        };
        self.moves += 1;

        if self.cards[a].symbol != self.cards[b].symbol {
            self.events.push(MemoryEvent::Mismatched);
            return Ok(FlipOutcome::Mismatched);
        }

        self.cards[a].face = Face::Matched;
        self.cards[b].face = Face::Matched;
        self.flipped.clear();
        self.matched_pairs += 1;
        self.events.push(MemoryEvent::Matched {
            pairs: self.matched_pairs,
        });

        let completed = self.matched_pairs * 2 == self.cards.len();
        if completed {
            self.phase = Phase::Complete;
            self.events.push(MemoryEvent::Completed {
                moves: self.moves,
                elapsed_ms: self.elapsed_ms,
            });
        }
        Ok(FlipOutcome::Matched { completed })
    }

    /// Turn a mismatched pair back face down. Returns `false` when no
    /// mismatch was pending.
    pub fn conceal(&mut self) -> bool {
        if self.flipped.len() < 2 {
            return false;
        }
        for i in self.flipped.drain(..) {
            self.cards[i].face = Face::Down;
        }
        true
    }

    /// Indices of a face-down pair, lowest first index. `Ok(None)` when no
    /// such pair exists; the hint is not spent in that case.
    pub fn hint(&mut self) -> Result<Option<(usize, usize)>, MemoryError> {
        if self.phase != Phase::Running {
            return Err(MemoryError::InvalidPhase);
        }
        if self.hints_left == 0 {
            return Err(MemoryError::NoHints);
        }

        let down: Vec<usize> = (0..self.cards.len())
            .filter(|&i| self.cards[i].face == Face::Down)
            .collect();
        let pair = down.iter().enumerate().find_map(|(n, &i)| {
            down[n + 1..]
                .iter()
                .find(|&&j| self.cards[j].symbol == self.cards[i].symbol)
                .map(|&j| (i, j))
        });

        if pair.is_some() {
            self.hints_left -= 1;
            self.events.push(MemoryEvent::HintUsed {
                remaining: self.hints_left,
            });
        }
        Ok(pair)
    }

    pub fn pause(&mut self) -> Result<(), MemoryError> {
        if self.phase != Phase::Running {
            return Err(MemoryError::InvalidPhase);
        }
        self.phase = Phase::Paused;
        self.events.push(MemoryEvent::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), MemoryError> {
        if self.phase != Phase::Paused {
            return Err(MemoryError::InvalidPhase);
        }
        self.phase = Phase::Running;
        self.events.push(MemoryEvent::Resumed);
        Ok(())
    }

    /// Advance the game clock. Ignored unless running.
    pub fn advance(&mut self, ms: u64) {
        if self.phase == Phase::Running {
            self.elapsed_ms += ms;
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn layout(&self) -> (usize, usize) {
        self.difficulty.layout()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn hints_left(&self) -> u32 {
        self.hints_left
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn awaiting_conceal(&self) -> bool {
        self.flipped.len() == 2
    }

    pub fn take_events(&mut self) -> Vec<MemoryEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for MemoryGame {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}
