//! 2048 sliding-tile puzzle.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::Game2048Error;
use crate::grid::{Grid, Point};

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_SIZE: usize = 4;
pub const MIN_SIZE: usize = 3;
pub const MAX_SIZE: usize = 6;
pub const WIN_TILE: u32 = 2048;
pub const UNDOS_PER_GAME: u32 = 3;
const UNDO_DEPTH: usize = 10;
const FOUR_PROBABILITY: f64 = 0.1;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Over,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Game2048Event {
    Started,
    Slid { direction: Direction, gained: u32 },
    TileSpawned { point: Point, value: u32 },
    Won,
    Undone,
    GameOver { score: u32, best_tile: u32 },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SlideReport {
    pub gained: u32,
    /// Values of the tiles produced by merges, in line order.
    pub merged: Vec<u32>,
    pub spawned: Option<(Point, u32)>,
    pub won: bool,
    pub game_over: bool,
}

#[derive(Clone)]
struct Saved {
    grid: Grid<u32>,
    score: u32,
    moves: u32,
}

// ============================================================================
// Line logic
// ============================================================================

/// Points of line `i`, ordered from the edge tiles slide toward.
fn line_points(size: usize, direction: Direction, i: usize) -> Vec<Point> {
    (0..size)
        .map(|k| match direction {
            Direction::Left => Point::new(k, i),
            Direction::Right => Point::new(size - 1 - k, i),
            Direction::Up => Point::new(i, k),
            Direction::Down => Point::new(i, size - 1 - k),
        })
        .collect()
}

/// Compress a line toward index 0, merging equal neighbours once each.
/// Returns the new line and the merged tile values.
pub fn slide_line(line: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut out = Vec::with_capacity(line.len());
    let mut merged = Vec::new();

    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            let value = tiles[i] * 2;
            out.push(value);
            merged.push(value);
            i += 2;
        } else {
            out.push(tiles[i]);
            i += 1;
        }
    }
    out.resize(line.len(), 0);
    (out, merged)
}

fn has_moves(grid: &Grid<u32>) -> bool {
    grid.points().any(|p| {
        let v = grid.get(p).unwrap_or(0);
        v == 0
            || grid.get(Point::new(p.x + 1, p.y)) == Some(v)
            || grid.get(Point::new(p.x, p.y + 1)) == Some(v)
    })
}

// ============================================================================
// Game
// ============================================================================

pub struct Game2048 {
    grid: Grid<u32>,
    score: u32,
    moves: u32,
    undo_stack: VecDeque<Saved>,
    undos_left: u32,
    won: bool,
    phase: Phase,
    rng: StdRng,
    events: Vec<Game2048Event>,
}

impl Game2048 {
    pub fn new(size: usize) -> Self {
        Self::with_rng(size, StdRng::from_entropy())
    }

    pub fn seeded(size: usize, seed: u64) -> Self {
        Self::with_rng(size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(size: usize, rng: StdRng) -> Self {
        let size = size.clamp(MIN_SIZE, MAX_SIZE);
        Self {
            grid: Grid::square(size, 0),
            score: 0,
            moves: 0,
            undo_stack: VecDeque::with_capacity(UNDO_DEPTH),
            undos_left: UNDOS_PER_GAME,
            won: false,
            phase: Phase::Idle,
            rng,
            events: Vec::new(),
        }
    }

    /// A running game on a prepared grid. Spawns use a fixed seed.
    pub fn from_grid(grid: Grid<u32>, seed: u64) -> Self {
        let mut game = Self::seeded(grid.width(), seed);
        game.won = grid.cells().iter().any(|&v| v >= WIN_TILE);
        game.grid = grid;
        game.phase = Phase::Running;
        game
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn start(&mut self) {
        self.grid.fill(0);
        self.score = 0;
        self.moves = 0;
        self.undo_stack.clear();
        self.undos_left = UNDOS_PER_GAME;
        self.won = false;
        self.phase = Phase::Running;
        self.events.clear();
        self.events.push(Game2048Event::Started);
        self.spawn_tile();
        self.spawn_tile();
    }

    /// Change the grid size; starts a fresh game if one was running.
    pub fn resize(&mut self, size: usize) {
        let size = size.clamp(MIN_SIZE, MAX_SIZE);
        let was_running = self.phase == Phase::Running;
        self.grid = Grid::square(size, 0);
        self.phase = Phase::Idle;
        if was_running {
            self.start();
        }
    }

    pub fn slide(&mut self, direction: Direction) -> Result<SlideReport, Game2048Error> {
        if self.phase != Phase::Running {
            return Err(Game2048Error::InvalidPhase);
        }

        let size = self.grid.width();
        let mut next = self.grid.clone();
        let mut merged = Vec::new();
        for i in 0..size {
            let points = line_points(size, direction, i);
            let line: Vec<u32> = points
                .iter()
                .map(|&p| self.grid.get(p).unwrap_or(0))
                .collect();
            let (slid, line_merges) = slide_line(&line);
            for (&p, &v) in points.iter().zip(&slid) {
                next.set(p, v);
            }
            merged.extend(line_merges);
        }

        if next == self.grid {
            return Err(Game2048Error::NoChange);
        }

        self.undo_stack.push_back(Saved {
            grid: self.grid.clone(),
            score: self.score,
            moves: self.moves,
        });
        if self.undo_stack.len() > UNDO_DEPTH {
            self.undo_stack.pop_front();
        }

        let gained: u32 = merged.iter().sum();
        self.grid = next;
        self.score += gained;
        self.moves += 1;
        self.events.push(Game2048Event::Slid { direction, gained });

        let won = !self.won && merged.contains(&WIN_TILE);
        if won {
            self.won = true;
            self.events.push(Game2048Event::Won);
        }

        let spawned = self.spawn_tile();

        let game_over = !has_moves(&self.grid);
        if game_over {
            self.phase = Phase::Over;
            self.events.push(Game2048Event::GameOver {
                score: self.score,
                best_tile: self.best_tile(),
            });
        }

        Ok(SlideReport {
            gained,
            merged,
            spawned,
            won,
            game_over,
        })
    }

    pub fn undo(&mut self) -> Result<(), Game2048Error> {
        if self.phase != Phase::Running {
            return Err(Game2048Error::InvalidPhase);
        }
        if self.undos_left == 0 {
            return Err(Game2048Error::NothingToUndo);
        }
        let saved = self
            .undo_stack
            .pop_back()
            .ok_or(Game2048Error::NothingToUndo)?;
        self.grid = saved.grid;
        self.score = saved.score;
        self.moves = saved.moves;
        self.undos_left -= 1;
        self.events.push(Game2048Event::Undone);
        Ok(())
    }

    fn spawn_tile(&mut self) -> Option<(Point, u32)> {
        let empty: Vec<Point> = self
            .grid
            .points()
            .filter(|&p| self.grid.get(p) == Some(0))
            .collect();
        let &point = empty.choose(&mut self.rng)?;
        let value = if self.rng.gen_bool(FOUR_PROBABILITY) { 4 } else { 2 };
        self.grid.set(point, value);
        self.events.push(Game2048Event::TileSpawned { point, value });
        Some((point, value))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn grid(&self) -> &Grid<u32> {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.width()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn undos_left(&self) -> u32 {
        self.undos_left
    }

    pub fn can_undo(&self) -> bool {
        self.phase == Phase::Running && self.undos_left > 0 && !self.undo_stack.is_empty()
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn best_tile(&self) -> u32 {
        self.grid.cells().iter().copied().max().unwrap_or(0)
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<Game2048Event> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game2048 {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}
