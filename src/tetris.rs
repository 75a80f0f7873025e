use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TetrisError;
use crate::grid::{Grid, Point};

// ============================================================================
// Configuration
// ============================================================================

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
pub const LINES_PER_LEVEL: u32 = 10;
pub const MAX_START_LEVEL: u32 = 10;

// Drop cadence (in milliseconds)
const BASE_DROP_MS: u64 = 1000;
const MIN_DROP_MS: u64 = 50;
const DROP_SPEEDUP_PER_LEVEL: u64 = 50;

// Scoring, indexed by lines cleared at once
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Offsets tried in order after a rotation: none, left, right, up,
/// left+up, right+up.
pub const KICKS: [(i16, i16); 6] = [(0, 0), (-1, 0), (1, 0), (0, -1), (-1, -1), (1, -1)];

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

/// Square occupancy matrix of a piece in its current orientation.
pub type Shape = Grid<bool>;

fn matrix<const N: usize>(rows: [[u8; N]; N]) -> Shape {
    let rows: Vec<Vec<bool>> = rows
        .iter()
        .map(|r| r.iter().map(|&c| c != 0).collect())
        .collect();
    Grid::from_rows(&rows)
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::S,
        TetrominoType::Z,
        TetrominoType::J,
        TetrominoType::L,
    ];

    /// Spawn orientation.
    pub fn shape(self) -> Shape {
        match self {
            TetrominoType::I => matrix([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]),
            TetrominoType::O => matrix([[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]),
            TetrominoType::T => matrix([[0, 0, 0], [1, 1, 1], [0, 1, 0]]),
            TetrominoType::S => matrix([[0, 0, 0], [0, 1, 1], [1, 1, 0]]),
            TetrominoType::Z => matrix([[0, 0, 0], [1, 1, 0], [0, 1, 1]]),
            TetrominoType::J => matrix([[0, 0, 0], [1, 1, 1], [0, 0, 1]]),
            TetrominoType::L => matrix([[0, 0, 0], [1, 1, 1], [1, 0, 0]]),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
            TetrominoType::J => "J",
            TetrominoType::L => "L",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tetromino {
    pub kind: TetrominoType,
    pub shape: Shape,
    pub position: Position,
    /// Quarter turns clockwise from spawn, 0..4.
    pub rotation: u8,
}

impl Tetromino {
    /// A piece at its spawn position, horizontally centered on row 0.
    pub fn new(kind: TetrominoType) -> Self {
        let shape = kind.shape();
        let x = (BOARD_WIDTH / 2) as i16 - (shape.width() / 2) as i16;
        Self {
            kind,
            shape,
            position: Position { x, y: 0 },
            rotation: 0,
        }
    }

    pub fn new_at(kind: TetrominoType, x: i16, y: i16) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            position: Position { x, y },
            rotation: 0,
        }
    }

    /// Board coordinates of every occupied cell.
    pub fn blocks(&self) -> Vec<Position> {
        self.shape
            .points()
            .filter(|&p| self.shape.get(p) == Some(true))
            .map(|p| Position {
                x: self.position.x + p.x as i16,
                y: self.position.y + p.y as i16,
            })
            .collect()
    }

    pub fn rotated_cw(&self) -> Self {
        Self {
            kind: self.kind,
            shape: self.shape.rotated_cw(),
            position: self.position,
            rotation: (self.rotation + 1) % 4,
        }
    }

    pub fn moved(&self, dx: i16, dy: i16) -> Self {
        Self {
            position: Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            },
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Empty,
    Locked(TetrominoType),
}

pub type Board = Grid<Cell>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TetrisState {
    Idle,
    Running,
    Paused,
    Over,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TetrisEvent {
    GameStarted,
    PieceMoved,
    PieceRotated,
    HardDropped(u32),
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Resumed,
    GameOver { score: u32, level: u32 },
}

/// What happened when a piece locked into the board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LockReport {
    pub cells: Vec<Position>,
    pub dropped_rows: u32,
    pub lines_cleared: u32,
    pub points: u32,
    pub level_up: bool,
    pub game_over: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved,
    Landed(LockReport),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TetrisConfig {
    pub start_level: u32,
}

impl Default for TetrisConfig {
    fn default() -> Self {
        Self { start_level: 1 }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TetrisSnapshot {
    pub board: Board,
    pub current: Tetromino,
    pub next: Tetromino,
    pub ghost: Tetromino,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub state: TetrisState,
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::ALL[self.rng.gen_range(0..TetrominoType::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        if self.pieces.is_empty() {
            return TetrominoType::O;
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Tetris {
    board: Board,
    current: Tetromino,
    next: Tetromino,
    score: u32,
    lines_cleared: u32,
    level: u32,
    start_level: u32,
    state: TetrisState,
    show_ghost: bool,
    provider: Box<dyn PieceProvider>,
    events: Vec<TetrisEvent>,
}

impl Tetris {
    pub fn new(config: TetrisConfig) -> Self {
        Self::with_provider(config, Box::new(RandomPieceProvider::new()))
    }

    /// Idle engine; pieces are drawn up front so the preview has something
    /// to show before `start`.
    pub fn with_provider(config: TetrisConfig, mut provider: Box<dyn PieceProvider>) -> Self {
        let start_level = config.start_level.clamp(1, MAX_START_LEVEL);
        let current = Tetromino::new(provider.next_piece());
        let next = Tetromino::new(provider.next_piece());

        Self {
            board: empty_board(),
            current,
            next,
            score: 0,
            lines_cleared: 0,
            level: start_level,
            start_level,
            state: TetrisState::Idle,
            show_ghost: true,
            provider,
            events: Vec::new(),
        }
    }

    /// A running game on a prepared board, for puzzles and tests.
    pub fn with_grid(board: Board, current: Tetromino, mut provider: Box<dyn PieceProvider>) -> Self {
        let next = Tetromino::new(provider.next_piece());
        Self {
            board,
            current,
            next,
            score: 0,
            lines_cleared: 0,
            level: 1,
            start_level: 1,
            state: TetrisState::Running,
            show_ghost: true,
            provider,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Begin a new game, discarding any game in progress.
    pub fn start(&mut self) {
        self.board = empty_board();
        self.score = 0;
        self.lines_cleared = 0;
        self.level = self.start_level;
        self.events.clear();
        self.current = Tetromino::new(self.provider.next_piece());
        self.next = Tetromino::new(self.provider.next_piece());
        self.state = TetrisState::Running;
        self.events.push(TetrisEvent::GameStarted);
    }

    pub fn set_start_level(&mut self, level: u32) {
        self.start_level = level.clamp(1, MAX_START_LEVEL);
        if self.state == TetrisState::Idle {
            self.level = self.start_level;
        }
    }

    pub fn pause(&mut self) -> Result<(), TetrisError> {
        if self.state != TetrisState::Running {
            return Err(TetrisError::InvalidPhase);
        }
        self.state = TetrisState::Paused;
        self.events.push(TetrisEvent::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TetrisError> {
        if self.state != TetrisState::Paused {
            return Err(TetrisError::InvalidPhase);
        }
        self.state = TetrisState::Running;
        self.events.push(TetrisEvent::Resumed);
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), TetrisError> {
        match self.state {
            TetrisState::Running => self.pause(),
            TetrisState::Paused => self.resume(),
            TetrisState::Idle | TetrisState::Over => Err(TetrisError::InvalidPhase),
        }
    }

    /// Switch the landing preview on or off. Survives restarts; any state.
    pub fn toggle_ghost(&mut self) -> bool {
        self.show_ghost = !self.show_ghost;
        self.show_ghost
    }

    /// Translate the current piece. A blocked purely downward move lands
    /// the piece: it locks, lines clear and the next piece spawns.
    pub fn move_piece(&mut self, dx: i16, dy: i16) -> Result<MoveOutcome, TetrisError> {
        self.ensure_running()?;
        let moved = self.current.moved(dx, dy);
        if self.is_valid_position(&moved) {
            self.current = moved;
            self.events.push(TetrisEvent::PieceMoved);
            Ok(MoveOutcome::Moved)
        } else if dx == 0 && dy > 0 {
            Ok(MoveOutcome::Landed(self.lock_and_spawn(0)))
        } else {
            Err(TetrisError::Blocked)
        }
    }

    /// One gravity step.
    pub fn tick(&mut self) -> Result<MoveOutcome, TetrisError> {
        self.move_piece(0, 1)
    }

    /// Rotate clockwise, trying each entry of [`KICKS`] in order.
    pub fn rotate(&mut self) -> Result<(), TetrisError> {
        self.ensure_running()?;
        let rotated = self.current.rotated_cw();
        for (dx, dy) in KICKS {
            let kicked = rotated.moved(dx, dy);
            if self.is_valid_position(&kicked) {
                self.current = kicked;
                self.events.push(TetrisEvent::PieceRotated);
                return Ok(());
            }
        }
        Err(TetrisError::Blocked)
    }

    pub fn hard_drop(&mut self) -> Result<LockReport, TetrisError> {
        self.ensure_running()?;
        let mut rows = 0;
        loop {
            let moved = self.current.moved(0, 1);
            if !self.is_valid_position(&moved) {
                break;
            }
            self.current = moved;
            rows += 1;
        }
        self.score += rows * HARD_DROP_POINTS_PER_ROW;
        self.events.push(TetrisEvent::HardDropped(rows));
        Ok(self.lock_and_spawn(rows))
    }

    fn ensure_running(&self) -> Result<(), TetrisError> {
        if self.state == TetrisState::Running {
            Ok(())
        } else {
            Err(TetrisError::InvalidPhase)
        }
    }

    fn lock_piece(&mut self) -> Vec<Position> {
        let kind = self.current.kind;
        let cells = self.current.blocks();
        for block in &cells {
            // cells still above the visible board are dropped
            if block.y >= 0 {
                self.board
                    .set(Point::new(block.x as usize, block.y as usize), Cell::Locked(kind));
            }
        }
        self.events.push(TetrisEvent::PieceLocked);
        cells
    }

    fn lock_and_spawn(&mut self, dropped_rows: u32) -> LockReport {
        let cells = self.lock_piece();
        let lines = self.clear_lines();
        let level_before = self.level;
        let points = self.add_score(lines);
        self.spawn_next_piece();

        LockReport {
            cells,
            dropped_rows,
            lines_cleared: lines,
            points,
            level_up: self.level > level_before,
            game_over: self.state == TetrisState::Over,
        }
    }

    /// Remove every full row, scanning bottom to top. Returns the count.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = BOARD_HEIGHT;

        while y > 0 {
            let row = y - 1;
            if self.is_row_complete(row) {
                self.board.remove_row(row, Cell::Empty);
                cleared += 1;
                // the row above has shifted into `row`; check it again
            } else {
                y -= 1;
            }
        }

        if cleared > 0 {
            self.events.push(TetrisEvent::LinesCleared(cleared));
        }

        cleared
    }

    /// Award points for `lines` cleared at once and advance the level.
    /// Returns the points awarded.
    pub fn add_score(&mut self, lines: u32) -> u32 {
        if lines == 0 {
            return 0;
        }
        let base = LINE_SCORES[lines.min(4) as usize];
        let points = base * self.level;
        self.score += points;
        self.lines_cleared += lines;

        let new_level = self.lines_cleared / LINES_PER_LEVEL + self.start_level;
        if new_level > self.level {
            self.level = new_level;
            self.events.push(TetrisEvent::LevelUp(self.level));
        }
        points
    }

    fn spawn_next_piece(&mut self) {
        let upcoming = Tetromino::new(self.provider.next_piece());
        self.current = std::mem::replace(&mut self.next, upcoming);

        if !self.is_valid_position(&self.current) {
            self.state = TetrisState::Over;
            self.events.push(TetrisEvent::GameOver {
                score: self.score,
                level: self.level,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Inside the side walls and above the floor, and not overlapping a
    /// locked cell. Cells above row 0 are allowed.
    pub fn is_valid_position(&self, piece: &Tetromino) -> bool {
        piece.blocks().iter().all(|b| {
            let (x, y) = (b.x as isize, b.y as isize);
            if y < 0 {
                return self.board.contains_signed(x, 0);
            }
            self.board.contains_signed(x, y)
                && self.board.get(Point::new(b.x as usize, b.y as usize)) == Some(Cell::Empty)
        })
    }

    /// Where the current piece would land if dropped straight down.
    pub fn ghost(&self) -> Tetromino {
        let mut ghost = self.current.clone();
        loop {
            let moved = ghost.moved(0, 1);
            if !self.is_valid_position(&moved) {
                return ghost;
            }
            ghost = moved;
        }
    }

    /// Milliseconds between gravity steps at the current level.
    pub fn drop_interval_ms(&self) -> u64 {
        let speedup = (self.level.saturating_sub(1)) as u64 * DROP_SPEEDUP_PER_LEVEL;
        BASE_DROP_MS.saturating_sub(speedup).max(MIN_DROP_MS)
    }

    /// Locked cells with the current piece drawn on top.
    pub fn render_grid(&self) -> Board {
        let mut visual = self.board.clone();
        for block in self.current.blocks() {
            if block.x >= 0 && block.y >= 0 {
                visual.set(
                    Point::new(block.x as usize, block.y as usize),
                    Cell::Locked(self.current.kind),
                );
            }
        }
        visual
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        TetrisSnapshot {
            board: self.board.clone(),
            current: self.current.clone(),
            next: self.next.clone(),
            ghost: self.ghost(),
            score: self.score,
            level: self.level,
            lines_cleared: self.lines_cleared,
            state: self.state,
        }
    }

    pub fn ghost_enabled(&self) -> bool {
        self.show_ghost
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> &Tetromino {
        &self.current
    }

    pub fn next_piece(&self) -> &Tetromino {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn start_level(&self) -> u32 {
        self.start_level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn state(&self) -> TetrisState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == TetrisState::Over
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.board.row(y).iter().all(|cell| *cell != Cell::Empty)
    }

    pub fn total_filled_cells(&self) -> usize {
        self.board.count(|cell| cell != Cell::Empty)
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<TetrisEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Tetris {
    fn default() -> Self {
        Self::new(TetrisConfig::default())
    }
}

pub fn empty_board() -> Board {
    Grid::new(BOARD_WIDTH, BOARD_HEIGHT, Cell::Empty)
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..BOARD_WIDTH {
            board.set(Point::new(x, y), Cell::Locked(TetrominoType::T));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        for x in 0..BOARD_WIDTH {
            if x != gap_x {
                board.set(Point::new(x, y), Cell::Locked(TetrominoType::T));
            }
        }
    }

    pub fn sequence(pieces: &[TetrominoType]) -> Box<dyn PieceProvider> {
        Box::new(SequencePieceProvider::new(pieces.to_vec()))
    }
}
