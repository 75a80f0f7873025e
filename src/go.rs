//! Go rules engine: stone groups, liberties, captures, simple Ko, and
//! area-style territory scoring without dead-stone removal.

use std::collections::VecDeque;
use std::fmt;

use crate::error::GoError;
use crate::grid::{Grid, Point};

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_KOMI: f32 = 6.5;
pub const MAX_HANDICAP: usize = 5;

/// Board snapshots kept for the Ko check: the position before the last
/// move and the current one.
const HISTORY_LEN: usize = 2;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    pub fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stone::Black => "Black",
            Stone::White => "White",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl From<Stone> for Cell {
    fn from(stone: Stone) -> Self {
        match stone {
            Stone::Black => Cell::Black,
            Stone::White => Cell::White,
        }
    }
}

pub type Board = Grid<Cell>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BoardSize {
    Nine,
    Thirteen,
    Nineteen,
}

impl BoardSize {
    pub fn dimension(self) -> usize {
        match self {
            BoardSize::Nine => 9,
            BoardSize::Thirteen => 13,
            BoardSize::Nineteen => 19,
        }
    }

    pub fn from_dimension(n: usize) -> Option<Self> {
        match n {
            9 => Some(BoardSize::Nine),
            13 => Some(BoardSize::Thirteen),
            19 => Some(BoardSize::Nineteen),
            _ => None,
        }
    }

    /// Handicap stones in placement order: two opposite corners, the other
    /// two corners, then tengen.
    pub fn handicap_points(self) -> [Point; MAX_HANDICAP] {
        let (lo, mid, hi) = match self {
            BoardSize::Nine => (2, 4, 6),
            BoardSize::Thirteen => (3, 6, 9),
            BoardSize::Nineteen => (3, 9, 15),
        };
        [
            Point::new(lo, lo),
            Point::new(hi, hi),
            Point::new(lo, hi),
            Point::new(hi, lo),
            Point::new(mid, mid),
        ]
    }

    /// Marked intersections for display.
    pub fn star_points(self) -> Vec<Point> {
        let n = self.dimension();
        let edge = if n < 13 { 2 } else { 3 };
        let far = n - 1 - edge;
        let mut points = vec![
            Point::new(edge, edge),
            Point::new(far, edge),
            Point::new(edge, far),
            Point::new(far, far),
        ];
        if n % 2 == 1 {
            points.push(Point::new(n / 2, n / 2));
        }
        points
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GoConfig {
    pub size: BoardSize,
    pub handicap: usize,
    pub komi: f32,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            size: BoardSize::Thirteen,
            handicap: 0,
            komi: DEFAULT_KOMI,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GoPhase {
    Setup,
    InProgress,
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    pub fn by(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
        }
    }

    fn credit(&mut self, stone: Stone, count: u32) {
        match stone {
            Stone::Black => self.black += count,
            Stone::White => self.white += count,
        }
    }
}

/// Ownership of every empty intersection after flood-filling empty regions.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Territory {
    pub owners: Grid<Option<Stone>>,
    pub black: u32,
    pub white: u32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GoScore {
    pub black_territory: u32,
    pub white_territory: u32,
    pub black_captures: u32,
    pub white_captures: u32,
    pub komi: f32,
}

impl GoScore {
    pub fn black_total(&self) -> f32 {
        (self.black_territory + self.black_captures) as f32
    }

    pub fn white_total(&self) -> f32 {
        (self.white_territory + self.white_captures) as f32 + self.komi
    }

    /// Higher total wins. Equal totals, only reachable with a whole-number
    /// komi, are a draw rather than a win for White.
    pub fn winner(&self) -> Option<Stone> {
        let (b, w) = (self.black_total(), self.white_total());
        if b > w {
            Some(Stone::Black)
        } else if w > b {
            Some(Stone::White)
        } else {
            None
        }
    }

    pub fn margin(&self) -> f32 {
        (self.black_total() - self.white_total()).abs()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GoOutcome {
    Scored(GoScore),
    Resignation { winner: Stone },
}

impl GoOutcome {
    pub fn winner(&self) -> Option<Stone> {
        match self {
            GoOutcome::Scored(score) => score.winner(),
            GoOutcome::Resignation { winner } => Some(*winner),
        }
    }
}

impl fmt::Display for GoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoOutcome::Scored(score) => match score.winner() {
                Some(w) => write!(f, "{} wins by {:.1} points", w.name(), score.margin()),
                None => write!(f, "Draw"),
            },
            GoOutcome::Resignation { winner } => write!(f, "{} wins by resignation", winner.name()),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveReport {
    pub point: Point,
    pub stone: Stone,
    pub captured: Vec<Point>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum GoEvent {
    GameStarted { size: BoardSize, handicap: usize },
    StonePlaced { point: Point, stone: Stone },
    StonesCaptured { color: Stone, points: Vec<Point> },
    MoveRejected { point: Point, reason: GoError },
    Passed(Stone),
    Resigned(Stone),
    GameOver(GoOutcome),
}

/// Read-only copy of everything the presentation needs.
#[derive(Clone, PartialEq, Debug)]
pub struct GoSnapshot {
    pub board: Board,
    pub phase: GoPhase,
    pub to_move: Stone,
    pub move_count: u32,
    pub pass_streak: u8,
    pub captures: Captures,
    pub ko_point: Option<Point>,
    pub outcome: Option<GoOutcome>,
}

// ============================================================================
// Board algorithms
// ============================================================================

/// The group containing `p`, empty if `p` holds no stone.
pub fn group_at(board: &Board, p: Point) -> Vec<Point> {
    let Some(cell) = board.get(p) else {
        return Vec::new();
    };
    if cell == Cell::Empty {
        return Vec::new();
    }
    let mut visited = Grid::new(board.width(), board.height(), false);
    board.component(p, |c| c == cell, &mut visited)
}

/// Number of distinct empty intersections adjacent to the group.
pub fn liberties(board: &Board, group: &[Point]) -> usize {
    board.frontier(group, |c| c == Cell::Empty).len()
}

pub fn territory(board: &Board) -> Territory {
    let (w, h) = (board.width(), board.height());
    let mut owners = Grid::new(w, h, None);
    let mut visited = Grid::new(w, h, false);
    let (mut black, mut white) = (0u32, 0u32);

    for p in board.points() {
        if board.get(p) != Some(Cell::Empty) || visited.get(p) == Some(true) {
            continue;
        }
        let region = board.component(p, |c| c == Cell::Empty, &mut visited);

        let (mut touches_black, mut touches_white) = (false, false);
        for n in board.frontier(&region, |c| c != Cell::Empty) {
            match board.get(n) {
                Some(Cell::Black) => touches_black = true,
                Some(Cell::White) => touches_white = true,
                _ => {}
            }
        }

        let owner = match (touches_black, touches_white) {
            (true, false) => Some(Stone::Black),
            (false, true) => Some(Stone::White),
            _ => None,
        };
        if let Some(stone) = owner {
            for &r in &region {
                owners.set(r, Some(stone));
            }
            match stone {
                Stone::Black => black += region.len() as u32,
                Stone::White => white += region.len() as u32,
            }
        }
    }

    Territory {
        owners,
        black,
        white,
    }
}

struct Resolution {
    board: Board,
    captured: Vec<Point>,
    ko_point: Option<Point>,
}

/// Play `stone` at `p` on a scratch copy of `board` and resolve captures,
/// suicide and Ko against `previous`.
fn resolve(
    board: &Board,
    previous: Option<&Board>,
    p: Point,
    stone: Stone,
) -> Result<Resolution, GoError> {
    match board.get(p) {
        None => return Err(GoError::OutOfBounds),
        Some(Cell::Empty) => {}
        Some(_) => return Err(GoError::Occupied),
    }

    let own = Cell::from(stone);
    let enemy = Cell::from(stone.opponent());
    let mut scratch = board.clone();
    scratch.set(p, own);

    let mut visited = Grid::new(scratch.width(), scratch.height(), false);
    let mut captured = Vec::new();
    let adjacent: Vec<Point> = scratch.neighbors(p).collect();
    for n in adjacent {
        if scratch.get(n) != Some(enemy) {
            continue;
        }
        let group = scratch.component(n, |c| c == enemy, &mut visited);
        if !group.is_empty() && liberties(&scratch, &group) == 0 {
            captured.extend(group);
        }
    }
    for &c in &captured {
        scratch.set(c, Cell::Empty);
    }

    let own_group = group_at(&scratch, p);
    let own_liberties = liberties(&scratch, &own_group);
    if captured.is_empty() && own_liberties == 0 {
        return Err(GoError::Suicide);
    }

    if previous == Some(&scratch) {
        return Err(GoError::Ko);
    }

    let ko_point = if captured.len() == 1 && own_group.len() == 1 && own_liberties == 1 {
        Some(captured[0])
    } else {
        None
    };

    Ok(Resolution {
        board: scratch,
        captured,
        ko_point,
    })
}

// ============================================================================
// Game
// ============================================================================

pub struct GoGame {
    config: GoConfig,
    board: Board,
    history: VecDeque<Board>,
    phase: GoPhase,
    to_move: Stone,
    move_count: u32,
    pass_streak: u8,
    captures: Captures,
    ko_point: Option<Point>,
    outcome: Option<GoOutcome>,
    events: Vec<GoEvent>,
}

impl GoGame {
    pub fn new(config: GoConfig) -> Self {
        let config = GoConfig {
            handicap: config.handicap.min(MAX_HANDICAP),
            ..config
        };
        let board = Board::square(config.size.dimension(), Cell::Empty);
        Self {
            config,
            board,
            history: VecDeque::with_capacity(HISTORY_LEN),
            phase: GoPhase::Setup,
            to_move: Stone::Black,
            move_count: 0,
            pass_streak: 0,
            captures: Captures::default(),
            ko_point: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Start a game from an arbitrary position, Black or White to move.
    /// Used to set up problems and test positions.
    pub fn from_position(config: GoConfig, board: Board, to_move: Stone) -> Self {
        let mut game = Self::new(config);
        game.board = board;
        game.history.push_back(game.board.clone());
        game.phase = GoPhase::InProgress;
        game.to_move = to_move;
        game
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Clear the board, place handicap stones and hand Black the first move.
    pub fn start(&mut self) {
        let mut board = Board::square(self.config.size.dimension(), Cell::Empty);
        for &p in self
            .config
            .size
            .handicap_points()
            .iter()
            .take(self.config.handicap)
        {
            board.set(p, Cell::Black);
        }

        self.board = board;
        self.history.clear();
        self.history.push_back(self.board.clone());
        self.phase = GoPhase::InProgress;
        self.to_move = Stone::Black;
        self.move_count = 0;
        self.pass_streak = 0;
        self.captures = Captures::default();
        self.ko_point = None;
        self.outcome = None;
        self.events.clear();
        self.events.push(GoEvent::GameStarted {
            size: self.config.size,
            handicap: self.config.handicap,
        });
    }

    pub fn set_board_size(&mut self, size: BoardSize) -> Result<(), GoError> {
        if self.phase == GoPhase::InProgress {
            return Err(GoError::InvalidPhase);
        }
        self.config.size = size;
        self.board = Board::square(size.dimension(), Cell::Empty);
        self.history.clear();
        self.phase = GoPhase::Setup;
        Ok(())
    }

    pub fn set_handicap(&mut self, stones: usize) -> Result<(), GoError> {
        if self.phase == GoPhase::InProgress {
            return Err(GoError::HandicapLocked);
        }
        self.config.handicap = stones.min(MAX_HANDICAP);
        Ok(())
    }

    pub fn attempt_move(&mut self, point: Point, stone: Stone) -> Result<MoveReport, GoError> {
        let result = self.try_move(point, stone);
        if let Err(reason) = result {
            self.events.push(GoEvent::MoveRejected { point, reason });
        }
        result
    }

    /// Place a stone for the player to move.
    pub fn play(&mut self, point: Point) -> Result<MoveReport, GoError> {
        self.attempt_move(point, self.to_move)
    }

    fn try_move(&mut self, point: Point, stone: Stone) -> Result<MoveReport, GoError> {
        self.check_turn(stone)?;
        let resolution = resolve(&self.board, self.previous_board(), point, stone)?;

        self.board = resolution.board;
        self.move_count += 1;
        self.pass_streak = 0;
        self.captures.credit(stone, resolution.captured.len() as u32);
        self.ko_point = resolution.ko_point;
        self.push_history();
        self.to_move = stone.opponent();

        self.events.push(GoEvent::StonePlaced { point, stone });
        if !resolution.captured.is_empty() {
            self.events.push(GoEvent::StonesCaptured {
                color: stone.opponent(),
                points: resolution.captured.clone(),
            });
        }

        Ok(MoveReport {
            point,
            stone,
            captured: resolution.captured,
        })
    }

    /// Pass the turn. Returns the outcome when this is the second pass in a row.
    pub fn pass(&mut self) -> Result<Option<GoOutcome>, GoError> {
        if self.phase != GoPhase::InProgress {
            return Err(GoError::InvalidPhase);
        }
        let passer = self.to_move;
        self.pass_streak += 1;
        self.move_count += 1;
        self.ko_point = None;
        self.push_history();
        self.to_move = passer.opponent();
        self.events.push(GoEvent::Passed(passer));

        if self.pass_streak >= 2 {
            let outcome = GoOutcome::Scored(self.score());
            self.finish(outcome);
            return Ok(Some(outcome));
        }
        Ok(None)
    }

    /// The player to move resigns.
    pub fn resign(&mut self) -> Result<GoOutcome, GoError> {
        if self.phase != GoPhase::InProgress {
            return Err(GoError::InvalidPhase);
        }
        let loser = self.to_move;
        self.events.push(GoEvent::Resigned(loser));
        let outcome = GoOutcome::Resignation {
            winner: loser.opponent(),
        };
        self.finish(outcome);
        Ok(outcome)
    }

    fn finish(&mut self, outcome: GoOutcome) {
        self.phase = GoPhase::Finished;
        self.outcome = Some(outcome);
        self.events.push(GoEvent::GameOver(outcome));
    }

    fn check_turn(&self, stone: Stone) -> Result<(), GoError> {
        if self.phase != GoPhase::InProgress {
            return Err(GoError::InvalidPhase);
        }
        if stone != self.to_move {
            return Err(GoError::WrongPlayer {
                expected: self.to_move,
            });
        }
        Ok(())
    }

    fn push_history(&mut self) {
        self.history.push_back(self.board.clone());
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// The board as it was before the most recent move or pass.
    fn previous_board(&self) -> Option<&Board> {
        let n = self.history.len();
        if n >= 2 {
            self.history.get(n - 2)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Would `stone` at `point` be accepted right now? Does not mutate.
    pub fn check_move(&self, point: Point, stone: Stone) -> Result<(), GoError> {
        self.check_turn(stone)?;
        resolve(&self.board, self.previous_board(), point, stone).map(|_| ())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GoConfig {
        self.config
    }

    pub fn size(&self) -> usize {
        self.board.width()
    }

    pub fn phase(&self) -> GoPhase {
        self.phase
    }

    pub fn to_move(&self) -> Stone {
        self.to_move
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn pass_streak(&self) -> u8 {
        self.pass_streak
    }

    pub fn captures(&self) -> Captures {
        self.captures
    }

    /// The intersection the player to move may not retake this turn, if the
    /// last move captured a single stone in a Ko shape.
    pub fn ko_point(&self) -> Option<Point> {
        self.ko_point
    }

    pub fn outcome(&self) -> Option<GoOutcome> {
        self.outcome
    }

    pub fn territory(&self) -> Territory {
        territory(&self.board)
    }

    /// Score of the current position: territory plus captures, komi to White.
    pub fn score(&self) -> GoScore {
        let t = territory(&self.board);
        GoScore {
            black_territory: t.black,
            white_territory: t.white,
            black_captures: self.captures.black,
            white_captures: self.captures.white,
            komi: self.config.komi,
        }
    }

    pub fn snapshot(&self) -> GoSnapshot {
        GoSnapshot {
            board: self.board.clone(),
            phase: self.phase,
            to_move: self.to_move,
            move_count: self.move_count,
            pass_streak: self.pass_streak,
            captures: self.captures,
            ko_point: self.ko_point,
            outcome: self.outcome,
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GoEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for GoGame {
    fn default() -> Self {
        Self::new(GoConfig::default())
    }
}
