//! Snake on a fixed 20×20 field.
//!
//! The engine has no clock of its own: the host calls [`Snake::step`] every
//! [`Snake::interval_ms`] milliseconds.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::SnakeError;
use crate::grid::Point;

pub const FIELD_SIZE: usize = 20;
pub const START: Point = Point::new(10, 10);
pub const FOOD_POINTS: u32 = 10;
const POINTS_PER_SPEED_LEVEL: u32 = 50;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn interval_ms(self) -> u64 {
        match self {
            Difficulty::Easy => 200,
            Difficulty::Medium => 150,
            Difficulty::Hard => 100,
            Difficulty::Extreme => 70,
        }
    }

    pub fn multiplier(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Extreme => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
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
    Over,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeathCause {
    Wall,
    SelfBite,
    BoardFull,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Moved,
    Ate { points: u32 },
    Died(DeathCause),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SnakeEvent {
    Started,
    Ate { score: u32, length: usize },
    SpeedUp(u32),
    Paused,
    Resumed,
    GameOver { score: u32, cause: DeathCause },
}

// ============================================================================
// Game
// ============================================================================

pub struct Snake {
    difficulty: Difficulty,
    body: VecDeque<Point>,
    direction: Direction,
    queued: Direction,
    food: Option<Point>,
    score: u32,
    speed_level: u32,
    phase: Phase,
    rng: StdRng,
    events: Vec<SnakeEvent>,
}

impl Snake {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, rng: StdRng) -> Self {
        Self {
            difficulty,
            body: VecDeque::from([START]),
            direction: Direction::Right,
            queued: Direction::Right,
            food: None,
            score: 0,
            speed_level: 1,
            phase: Phase::Idle,
            rng,
            events: Vec::new(),
        }
    }

    /// A running game with an explicit body (head first) and food.
    pub fn from_parts(
        difficulty: Difficulty,
        body: Vec<Point>,
        direction: Direction,
        food: Option<Point>,
    ) -> Self {
        let mut game = Self::seeded(difficulty, 0);
        game.body = body.into();
        game.direction = direction;
        game.queued = direction;
        game.food = food;
        game.phase = Phase::Running;
        game
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn start(&mut self) {
        self.body = VecDeque::from([START]);
        self.direction = Direction::Right;
        self.queued = Direction::Right;
        self.score = 0;
        self.speed_level = 1;
        self.phase = Phase::Running;
        self.events.clear();
        self.events.push(SnakeEvent::Started);
        self.food = self.free_cell();
    }

    /// Only takes effect from the next game.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.phase != Phase::Running && self.phase != Phase::Paused {
            self.difficulty = difficulty;
        }
    }

    pub fn turn(&mut self, direction: Direction) -> Result<(), SnakeError> {
        if self.phase != Phase::Running {
            return Err(SnakeError::InvalidPhase);
        }
        if direction == self.direction.opposite() {
            return Err(SnakeError::Reversal);
        }
        self.queued = direction;
        Ok(())
    }

    pub fn step(&mut self) -> Result<StepOutcome, SnakeError> {
        if self.phase != Phase::Running {
            return Err(SnakeError::InvalidPhase);
        }

        self.direction = self.queued;
        let (dx, dy) = self.direction.delta();
        let Some(&head) = self.body.front() else {
            return Err(SnakeError::InvalidPhase);
        };

        let next = match head.offset(dx, dy) {
            Some(p) if p.x < FIELD_SIZE && p.y < FIELD_SIZE => p,
            _ => return Ok(self.die(DeathCause::Wall)),
        };
        if self.body.contains(&next) {
            return Ok(self.die(DeathCause::SelfBite));
        }

        self.body.push_front(next);

        if self.food != Some(next) {
            self.body.pop_back();
            return Ok(StepOutcome::Moved);
        }

        let points = FOOD_POINTS * self.difficulty.multiplier();
        self.score += points;
        self.events.push(SnakeEvent::Ate {
            score: self.score,
            length: self.body.len(),
        });

        let level = self.score / POINTS_PER_SPEED_LEVEL + 1;
        if level != self.speed_level {
            self.speed_level = level;
            self.events.push(SnakeEvent::SpeedUp(level));
        }

        self.food = self.free_cell();
        if self.food.is_none() {
            return Ok(self.die(DeathCause::BoardFull));
        }
        Ok(StepOutcome::Ate { points })
    }

    pub fn pause(&mut self) -> Result<(), SnakeError> {
        if self.phase != Phase::Running {
            return Err(SnakeError::InvalidPhase);
        }
        self.phase = Phase::Paused;
        self.events.push(SnakeEvent::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SnakeError> {
        if self.phase != Phase::Paused {
            return Err(SnakeError::InvalidPhase);
        }
        self.phase = Phase::Running;
        self.events.push(SnakeEvent::Resumed);
        Ok(())
    }

    fn die(&mut self, cause: DeathCause) -> StepOutcome {
        self.phase = Phase::Over;
        self.events.push(SnakeEvent::GameOver {
            score: self.score,
            cause,
        });
        StepOutcome::Died(cause)
    }

    fn free_cell(&mut self) -> Option<Point> {
        let free: Vec<Point> = (0..FIELD_SIZE)
            .flat_map(|y| (0..FIELD_SIZE).map(move |x| Point::new(x, y)))
            .filter(|p| !self.body.contains(p))
            .collect();
        free.choose(&mut self.rng).copied()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Segments, head first.
    pub fn body(&self) -> impl Iterator<Item = Point> + '_ {
        self.body.iter().copied()
    }

    pub fn head(&self) -> Option<Point> {
        self.body.front().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn food(&self) -> Option<Point> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed_level(&self) -> u32 {
        self.speed_level
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interval_ms(&self) -> u64 {
        self.difficulty.interval_ms()
    }

    pub fn take_events(&mut self) -> Vec<SnakeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Snake {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}
