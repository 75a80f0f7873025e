//! Salvo Battleship against a computer opponent.
//!
//! Both sides fire one shot per ship they still have afloat. The player
//! fires shot by shot with [`BattleshipGame::fire`]; once the salvo is spent
//! the host calls [`BattleshipGame::enemy_turn`] to resolve the reply.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::BattleshipError;
use crate::grid::{Grid, Point};

pub const GRID_SIZE: usize = 10;
const PLACEMENT_RETRIES: usize = 32;

// ============================================================================
// Ships
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::Destroyer,
    ];

    pub fn len(self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "Carrier",
            ShipKind::Battleship => "Battleship",
            ShipKind::Cruiser => "Cruiser",
            ShipKind::Submarine => "Submarine",
            ShipKind::Destroyer => "Destroyer",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ship {
    pub kind: ShipKind,
    pub cells: Vec<Point>,
    pub hits: usize,
}

impl Ship {
    pub fn is_sunk(&self) -> bool {
        self.hits >= self.kind.len()
    }
}

/// Cells covered by a ship, or `None` if any would leave the grid.
pub fn ship_cells(kind: ShipKind, origin: Point, orientation: Orientation) -> Option<Vec<Point>> {
    (0..kind.len())
        .map(|i| {
            let p = match orientation {
                Orientation::Horizontal => Point::new(origin.x + i, origin.y),
                Orientation::Vertical => Point::new(origin.x, origin.y + i),
            };
            (p.x < GRID_SIZE && p.y < GRID_SIZE).then_some(p)
        })
        .collect()
}

// ============================================================================
// Ocean
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Mark {
    #[default]
    Untried,
    Miss,
    Hit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shot {
    Miss,
    Hit(ShipKind),
    Sunk(ShipKind),
}

/// One side's grid: its ships and the shots it has received.
#[derive(Clone, Debug)]
pub struct Ocean {
    ships: Vec<Ship>,
    layout: Grid<Option<ShipKind>>,
    marks: Grid<Mark>,
}

impl Ocean {
    pub fn new() -> Self {
        Self {
            ships: Vec::with_capacity(ShipKind::ALL.len()),
            layout: Grid::square(GRID_SIZE, None),
            marks: Grid::square(GRID_SIZE, Mark::Untried),
        }
    }

    /// Whether `kind` fits at `origin`. Cells held by `kind` itself count
    /// as free so a placed ship can be moved.
    pub fn can_place(&self, kind: ShipKind, origin: Point, orientation: Orientation) -> bool {
        match ship_cells(kind, origin, orientation) {
            Some(cells) => cells
                .iter()
                .all(|&p| matches!(self.layout.get(p), Some(held) if held.is_none() || held == Some(kind))),
            None => false,
        }
    }

    /// Place `kind`, moving it if it was already placed.
    pub fn place(
        &mut self,
        kind: ShipKind,
        origin: Point,
        orientation: Orientation,
    ) -> Result<(), BattleshipError> {
        if !self.can_place(kind, origin, orientation) {
            return Err(BattleshipError::CannotPlace);
        }
        let cells = ship_cells(kind, origin, orientation).ok_or(BattleshipError::CannotPlace)?;
        self.remove(kind);
        for &p in &cells {
            self.layout.set(p, Some(kind));
        }
        self.ships.push(Ship {
            kind,
            cells,
            hits: 0,
        });
        Ok(())
    }

    pub fn remove(&mut self, kind: ShipKind) {
        if let Some(i) = self.ships.iter().position(|s| s.kind == kind) {
            let ship = self.ships.remove(i);
            for p in ship.cells {
                self.layout.set(p, None);
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Ocean::new();
    }

    /// Fill the ocean with a complete random fleet.
    pub fn randomize(&mut self, rng: &mut StdRng) {
        for _ in 0..PLACEMENT_RETRIES {
            self.clear();
            if ShipKind::ALL.iter().all(|&kind| self.place_randomly(kind, rng)) {
                return;
            }
        }
    }

    fn place_randomly(&mut self, kind: ShipKind, rng: &mut StdRng) -> bool {
        let options: Vec<(Point, Orientation)> = self
            .layout
            .points()
            .flat_map(|p| {
                [Orientation::Horizontal, Orientation::Vertical].map(move |o| (p, o))
            })
            .filter(|&(p, o)| self.can_place(kind, p, o))
            .collect();
        match options.choose(rng) {
            Some(&(p, o)) => self.place(kind, p, o).is_ok(),
            None => false,
        }
    }

    /// Resolve an incoming shot.
    pub fn receive(&mut self, p: Point) -> Result<Shot, BattleshipError> {
        match self.marks.get(p) {
            None => return Err(BattleshipError::OutOfBounds),
            Some(Mark::Untried) => {}
            Some(_) => return Err(BattleshipError::AlreadyTargeted),
        }

        let Some(Some(kind)) = self.layout.get(p) else {
            self.marks.set(p, Mark::Miss);
            return Ok(Shot::Miss);
        };
        self.marks.set(p, Mark::Hit);

        let ship = self
            .ships
            .iter_mut()
            .find(|s| s.kind == kind)
            .ok_or(BattleshipError::OutOfBounds)?;
        ship.hits += 1;
        Ok(if ship.is_sunk() {
            Shot::Sunk(kind)
        } else {
            Shot::Hit(kind)
        })
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, kind: ShipKind) -> Option<&Ship> {
        self.ships.iter().find(|s| s.kind == kind)
    }

    pub fn ship_at(&self, p: Point) -> Option<ShipKind> {
        self.layout.get(p).flatten()
    }

    pub fn mark(&self, p: Point) -> Mark {
        self.marks.get(p).unwrap_or_default()
    }

    pub fn is_sunk_at(&self, p: Point) -> bool {
        self.ship_at(p)
            .and_then(|kind| self.ship(kind))
            .is_some_and(Ship::is_sunk)
    }

    pub fn is_complete(&self) -> bool {
        ShipKind::ALL.iter().all(|&k| self.ship(k).is_some())
    }

    pub fn afloat(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }

    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && self.afloat() == 0
    }

    pub fn untried(&self) -> Vec<Point> {
        self.marks
            .points()
            .filter(|&p| self.mark(p) == Mark::Untried)
            .collect()
    }
}

impl Default for Ocean {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Game
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Setup,
    Battle,
    Over,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ShotStats {
    pub hits: u32,
    pub misses: u32,
}

impl ShotStats {
    fn record(&mut self, shot: Shot) {
        match shot {
            Shot::Miss => self.misses += 1,
            Shot::Hit(_) | Shot::Sunk(_) => self.hits += 1,
        }
    }

    pub fn shots(&self) -> u32 {
        self.hits + self.misses
    }

    /// Percentage of shots that hit, 0 before the first shot.
    pub fn accuracy(&self) -> u32 {
        match self.shots() {
            0 => 0,
            n => self.hits * 100 / n,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BattleshipEvent {
    BattleStarted,
    Fired { side: Side, point: Point, shot: Shot },
    TurnChanged { side: Side, shots: usize },
    GameOver { winner: Side },
}

pub struct BattleshipGame {
    player: Ocean,
    enemy: Ocean,
    phase: Phase,
    turn: Side,
    shots_left: usize,
    winner: Option<Side>,
    player_stats: ShotStats,
    enemy_stats: ShotStats,
    rng: StdRng,
    events: Vec<BattleshipEvent>,
}

impl BattleshipGame {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            player: Ocean::new(),
            enemy: Ocean::new(),
            phase: Phase::Setup,
            turn: Side::Player,
            shots_left: 0,
            winner: None,
            player_stats: ShotStats::default(),
            enemy_stats: ShotStats::default(),
            rng,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        origin: Point,
        orientation: Orientation,
    ) -> Result<(), BattleshipError> {
        if self.phase != Phase::Setup {
            return Err(BattleshipError::InvalidPhase);
        }
        self.player.place(kind, origin, orientation)
    }

    pub fn random_placement(&mut self) -> Result<(), BattleshipError> {
        if self.phase != Phase::Setup {
            return Err(BattleshipError::InvalidPhase);
        }
        self.player.randomize(&mut self.rng);
        Ok(())
    }

    pub fn clear_ships(&mut self) -> Result<(), BattleshipError> {
        if self.phase != Phase::Setup {
            return Err(BattleshipError::InvalidPhase);
        }
        self.player.clear();
        Ok(())
    }

    /// Start against a randomly deployed enemy fleet.
    pub fn start_battle(&mut self) -> Result<(), BattleshipError> {
        let mut enemy = Ocean::new();
        enemy.randomize(&mut self.rng);
        self.start_battle_against(enemy)
    }

    /// Start against a given enemy deployment.
    pub fn start_battle_against(&mut self, enemy: Ocean) -> Result<(), BattleshipError> {
        if self.phase != Phase::Setup {
            return Err(BattleshipError::InvalidPhase);
        }
        if !self.player.is_complete() || !enemy.is_complete() {
            return Err(BattleshipError::FleetIncomplete);
        }
        self.enemy = enemy;
        self.phase = Phase::Battle;
        self.turn = Side::Player;
        self.shots_left = self.player.afloat();
        self.events.push(BattleshipEvent::BattleStarted);
        Ok(())
    }

    /// Back to setup with empty oceans and cleared statistics.
    pub fn reset(&mut self) {
        let rng = std::mem::replace(&mut self.rng, StdRng::seed_from_u64(0));
        *self = Self::with_rng(rng);
    }

    // ------------------------------------------------------------------------
    // Battle
    // ------------------------------------------------------------------------

    pub fn fire(&mut self, target: Point) -> Result<Shot, BattleshipError> {
        if self.phase != Phase::Battle {
            return Err(BattleshipError::InvalidPhase);
        }
        if self.turn != Side::Player || self.shots_left == 0 {
            return Err(BattleshipError::NotYourTurn);
        }

        let shot = self.enemy.receive(target)?;
        self.player_stats.record(shot);
        self.shots_left -= 1;
        self.events.push(BattleshipEvent::Fired {
            side: Side::Player,
            point: target,
            shot,
        });

        if self.enemy.all_sunk() {
            self.finish(Side::Player);
        } else if self.shots_left == 0 {
            self.turn = Side::Enemy;
            self.events.push(BattleshipEvent::TurnChanged {
                side: Side::Enemy,
                shots: self.enemy.afloat(),
            });
        }
        Ok(shot)
    }

    /// Resolve the enemy salvo and hand the turn back to the player.
    pub fn enemy_turn(&mut self) -> Result<Vec<(Point, Shot)>, BattleshipError> {
        if self.phase != Phase::Battle {
            return Err(BattleshipError::InvalidPhase);
        }
        if self.turn != Side::Enemy {
            return Err(BattleshipError::NotYourTurn);
        }

        let mut volley = Vec::new();
        for _ in 0..self.enemy.afloat() {
            let Some(target) = self.enemy_target() else {
                break;
            };
            let shot = self.player.receive(target)?;
            self.enemy_stats.record(shot);
            self.events.push(BattleshipEvent::Fired {
                side: Side::Enemy,
                point: target,
                shot,
            });
            volley.push((target, shot));

            if self.player.all_sunk() {
                self.finish(Side::Enemy);
                return Ok(volley);
            }
        }

        self.turn = Side::Player;
        self.shots_left = self.player.afloat();
        self.events.push(BattleshipEvent::TurnChanged {
            side: Side::Player,
            shots: self.shots_left,
        });
        Ok(volley)
    }

    /// First untried neighbour of a hit on a ship still afloat, scanning
    /// hits in row-major order; otherwise a random untried cell.
    fn enemy_target(&mut self) -> Option<Point> {
        let ocean = &self.player;
        let follow_up = ocean
            .marks
            .points()
            .filter(|&p| ocean.mark(p) == Mark::Hit && !ocean.is_sunk_at(p))
            .find_map(|hit| {
                ocean
                    .marks
                    .neighbors(hit)
                    .find(|&n| ocean.mark(n) == Mark::Untried)
            });
        if follow_up.is_some() {
            return follow_up;
        }
        self.player.untried().choose(&mut self.rng).copied()
    }

    fn finish(&mut self, winner: Side) {
        self.phase = Phase::Over;
        self.winner = Some(winner);
        self.shots_left = 0;
        self.events.push(BattleshipEvent::GameOver { winner });
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn player_ocean(&self) -> &Ocean {
        &self.player
    }

    pub fn enemy_ocean(&self) -> &Ocean {
        &self.enemy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn shots_left(&self) -> usize {
        self.shots_left
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn player_stats(&self) -> ShotStats {
        self.player_stats
    }

    pub fn enemy_stats(&self) -> ShotStats {
        self.enemy_stats
    }

    pub fn take_events(&mut self) -> Vec<BattleshipEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for BattleshipGame {
    fn default() -> Self {
        Self::new()
    }
}
