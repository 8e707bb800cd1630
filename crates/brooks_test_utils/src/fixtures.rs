//! Test fixtures and helpers.
//!
//! Pre-built sandboxes for consistent testing. Every fixture uses a 64x64
//! map, the default latency of 2 frames, and leaves the clock on a frame the
//! dispatcher acts on.

use brooks_core::host::{GameHost, PlayerId, UnitId};
use brooks_core::position::{Position, TilePosition};
use brooks_core::sandbox::SandboxGame;
use brooks_core::unit_type::{Race, UnitType};

/// Map size used by every fixture.
pub const MAP_SIZE: TilePosition = TilePosition::new(64, 64);

/// Anchor of the main depot.
pub const DEPOT_ANCHOR: TilePosition = TilePosition::new(8, 8);

/// A player's starting base.
#[derive(Debug, Clone)]
pub struct Base {
    /// The sandbox.
    pub game: SandboxGame,
    /// The controlled player.
    pub me: PlayerId,
    /// The main depot.
    pub depot: UnitId,
    /// Starting workers, in spawn order.
    pub workers: Vec<UnitId>,
    /// Mineral fields, in spawn order.
    pub minerals: Vec<UnitId>,
}

impl Base {
    /// Add a vespene geyser a short walk from the depot.
    pub fn with_geyser(mut self) -> (Self, UnitId) {
        let geyser = self
            .game
            .spawn_at_tile(PlayerId::NEUTRAL, UnitType::VespeneGeyser, TilePosition::new(8, 16));
        (self, geyser)
    }

    /// Add an enemy player with one combat unit next to the depot.
    pub fn with_enemy(mut self, race: Race) -> (Self, UnitId) {
        let enemy = self.game.add_player("Enemy", race, 0);
        let position = DEPOT_ANCHOR.to_position();
        let attacker = self
            .game
            .spawn(enemy, race.soldier(), Position::new(position.x - 40, position.y));
        (self, attacker)
    }

    /// Supply used and total of the controlled player.
    #[must_use]
    pub fn supply(&self) -> (u32, u32) {
        self.game
            .self_player()
            .map_or((0, 0), |p| (p.supply_used, p.supply_total))
    }
}

/// A standard start: depot, four workers, eight mineral fields, 50 minerals.
#[must_use]
pub fn base(race: Race) -> Base {
    base_with(race, 4, 50)
}

/// A start with `workers` workers and a `minerals` bank.
#[must_use]
pub fn base_with(race: Race, workers: usize, minerals: u32) -> Base {
    let mut game = SandboxGame::new("fixture", MAP_SIZE);
    let me = game.add_player("Tester", race, minerals);
    game.set_self(Some(me));
    let depot = game.spawn_at_tile(me, race.resource_depot(), DEPOT_ANCHOR);

    let mineral_fields = (0..8)
        .map(|i| {
            game.spawn_at_tile(
                PlayerId::NEUTRAL,
                UnitType::MineralField,
                TilePosition::new(16, 4 + i),
            )
        })
        .collect();

    let worker_spots = (0..workers).map(|i| Position::new(420 + 12 * i as i32, 300));
    let workers = worker_spots
        .map(|spot| game.spawn(me, race.worker(), spot))
        .collect();

    game.drain_events();
    Base {
        game,
        me,
        depot,
        workers,
        minerals: mineral_fields,
    }
}

/// A Terran base whose command center cannot train: ten SCVs fill the
/// ten supply it provides. The bank covers a supply depot.
#[must_use]
pub fn supply_blocked_terran() -> Base {
    let mut base = base_with(Race::Terran, 10, 1000);
    base.game.set_frame(400);
    base
}

/// One idle worker on an otherwise empty map.
#[must_use]
pub fn lone_worker(race: Race) -> (SandboxGame, PlayerId, UnitId) {
    let mut game = SandboxGame::new("lone", MAP_SIZE);
    let me = game.add_player("Tester", race, 500);
    game.set_self(Some(me));
    game.spawn_at_tile(me, race.resource_depot(), DEPOT_ANCHOR);
    let worker = game.spawn(me, race.worker(), Position::new(600, 600));
    game.drain_events();
    (game, me, worker)
}
