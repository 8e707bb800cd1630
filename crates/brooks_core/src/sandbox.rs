//! In-memory game host.
//!
//! `SandboxGame` implements [`GameHost`] without an engine behind it. It is
//! small on purpose: orders are validated the way the real host validates
//! them (resources, supply, build sites, targets) and then play out through
//! a handful of timers in [`SandboxGame::step`]:
//!
//! - **Construction**: structures appear incomplete and finish after their
//!   build time. Terran workers stay busy for the duration, Protoss workers
//!   are released at once, Zerg drones are consumed.
//! - **Training**: the producer is busy for the build time, then the new
//!   unit spawns next to it (larva morph in place).
//! - **Mining**: a gathering worker picks up cargo mid-trip and banks it at
//!   the end of the trip.
//! - **Combat**: attackers deal their damage every cooldown; units at zero
//!   hit points are removed.
//! - **Movement**: instant, arriving on the next step.
//!
//! Other players' units are only reported by [`GameHost::closest_unit`] while
//! one of the controlled player's units is within [`SIGHT_RANGE`] of them.
//!
//! Units live in a `BTreeMap` so every iteration (closest-unit ties, build
//! site search, step order) is deterministic.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::host::{
    GameHost, Order, Overlay, PlayerId, PlayerInfo, ResourceKind, UnitId, UnitInfo, UnitStatus,
};
use crate::position::{Position, TilePosition};
use crate::unit_type::{Race, UnitType};

/// Hard supply ceiling, half-units.
pub const SUPPLY_LIMIT: u32 = 400;

/// Frames into a mining trip when the worker picks up cargo.
pub const PICKUP_FRAME: u32 = 60;

/// Frames per full mining trip (out, harvest, back).
pub const TRIP_FRAMES: u32 = 90;

/// Resources delivered per trip.
pub const TRIP_YIELD: u32 = 8;

/// Frames between larva spawns at each hatchery.
pub const LARVA_INTERVAL: u32 = 342;

/// Larva a hatchery holds at most.
pub const MAX_LARVA_PER_HATCHERY: usize = 3;

/// Farthest ring, in tiles, searched for a build site.
pub const MAX_BUILD_SEARCH_RADIUS: i32 = 32;

/// Pixels within which the controlled player sees other players' units.
pub const SIGHT_RANGE: i32 = 7 * 32;

/// Minerals in a fresh mineral field.
pub const MINERAL_FIELD_RESOURCES: u32 = 1500;

/// Gas in a fresh vespene geyser.
pub const GEYSER_RESOURCES: u32 = 5000;

/// Something that happened to a unit, for forwarding to agent hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxEvent {
    /// A unit entered the game.
    Created(UnitId),
    /// A structure or unit finished.
    Completed(UnitId),
    /// A unit changed type in place (Zerg morphs).
    Morphed(UnitId),
    /// A unit left the game; the snapshot is its last state.
    Destroyed(UnitInfo),
}

/// One `issue` call and its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Frame the order was issued on.
    pub frame: u32,
    /// Unit ordered.
    pub unit: UnitId,
    /// The order.
    pub order: Order,
    /// Host verdict.
    pub result: Result<(), CommandError>,
}

/// An overlay and the frame it stops drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveOverlay {
    /// What to draw.
    pub overlay: Overlay,
    /// Frame the overlay was registered on.
    pub registered_at: u32,
    /// Number of frames it was registered for.
    pub frames: u32,
}

impl ActiveOverlay {
    /// First frame on which this overlay is no longer drawn.
    #[must_use]
    pub const fn expires_at(&self) -> u32 {
        self.registered_at + self.frames
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Idle,
    Moving { destination: Position },
    Attacking { target: UnitId, cooldown: u32 },
    Gathering { target: UnitId, timer: u32 },
    ReturningCargo,
    Constructing { remaining: u32 },
    UnderConstruction { remaining: u32 },
    Training { unit_type: UnitType, remaining: u32 },
}

#[derive(Debug, Clone)]
struct SandboxUnit {
    info: UnitInfo,
    task: Task,
    cargo: u32,
}

impl SandboxUnit {
    fn set_task(&mut self, task: Task) {
        self.task = task;
        let status = &mut self.info.status;
        status.idle = matches!(task, Task::Idle);
        status.attacking = matches!(task, Task::Attacking { .. });
        status.constructing = matches!(task, Task::Constructing { .. });
        if !matches!(task, Task::Gathering { .. }) {
            self.info.gathering = None;
        }
    }
}

/// Deterministic in-memory implementation of [`GameHost`].
#[derive(Debug, Clone)]
pub struct SandboxGame {
    map_name: String,
    map_size: TilePosition,
    frame: u32,
    latency_frames: u32,
    fps: u32,
    replay: bool,
    paused: bool,
    me: Option<PlayerId>,
    players: BTreeMap<PlayerId, PlayerInfo>,
    units: BTreeMap<UnitId, SandboxUnit>,
    next_unit_id: u32,
    overlays: Vec<ActiveOverlay>,
    chat: Vec<String>,
    commands: Vec<CommandRecord>,
    last_error: Option<CommandError>,
    events: Vec<SandboxEvent>,
}

impl SandboxGame {
    /// Create an empty map of `map_size` tiles with only the neutral player.
    #[must_use]
    pub fn new(map_name: impl Into<String>, map_size: TilePosition) -> Self {
        let mut players = BTreeMap::new();
        players.insert(
            PlayerId::NEUTRAL,
            PlayerInfo {
                id: PlayerId::NEUTRAL,
                name: "Neutral".to_string(),
                race: Race::Terran,
                is_neutral: true,
                is_observer: false,
                supply_used: 0,
                supply_total: 0,
                minerals: 0,
                gas: 0,
            },
        );
        Self {
            map_name: map_name.into(),
            map_size,
            frame: 0,
            latency_frames: 2,
            fps: 24,
            replay: false,
            paused: false,
            me: None,
            players,
            units: BTreeMap::new(),
            next_unit_id: 1,
            overlays: Vec::new(),
            chat: Vec::new(),
            commands: Vec::new(),
            last_error: None,
            events: Vec::new(),
        }
    }

    // ========================================
    // Setup
    // ========================================

    /// Add a player with a bank of minerals. Returns its id.
    pub fn add_player(&mut self, name: impl Into<String>, race: Race, minerals: u32) -> PlayerId {
        let id = PlayerId(self.players.len().saturating_sub(1) as u8);
        self.players.insert(
            id,
            PlayerInfo {
                id,
                name: name.into(),
                race,
                is_neutral: false,
                is_observer: false,
                supply_used: 0,
                supply_total: 0,
                minerals,
                gas: 0,
            },
        );
        id
    }

    /// Make `player` the one the agent controls. `None` observes.
    pub fn set_self(&mut self, player: Option<PlayerId>) {
        self.me = player;
    }

    /// Spawn a completed unit centred on `position`.
    pub fn spawn(&mut self, owner: PlayerId, unit_type: UnitType, position: Position) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let resources = match unit_type {
            UnitType::MineralField => MINERAL_FIELD_RESOURCES,
            UnitType::VespeneGeyser => GEYSER_RESOURCES,
            _ => 0,
        };
        self.units.insert(
            id,
            SandboxUnit {
                info: UnitInfo {
                    id,
                    unit_type,
                    owner,
                    position,
                    hit_points: unit_type.max_hit_points(),
                    resources,
                    status: UnitStatus::READY,
                    carrying: None,
                    gathering: None,
                },
                task: Task::Idle,
                cargo: 0,
            },
        );
        self.events.push(SandboxEvent::Created(id));
        self.recount_supply(owner);
        id
    }

    /// Spawn a completed structure or resource with its footprint at `anchor`.
    pub fn spawn_at_tile(&mut self, owner: PlayerId, unit_type: UnitType, anchor: TilePosition) -> UnitId {
        self.spawn(owner, unit_type, anchor.footprint_center(unit_type.tile_size()))
    }

    /// Spawn a structure that has just started construction.
    pub fn spawn_incomplete(&mut self, owner: PlayerId, unit_type: UnitType, anchor: TilePosition) -> UnitId {
        let id = self.spawn_at_tile(owner, unit_type, anchor);
        if let Some(unit) = self.units.get_mut(&id) {
            unit.info.status.completed = false;
            unit.info.hit_points = unit_type.max_hit_points() / 10;
            unit.set_task(Task::UnderConstruction {
                remaining: unit_type.build_time(),
            });
        }
        self.recount_supply(owner);
        id
    }

    /// Mutable access to a unit's reported state, for staging scenarios.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitInfo> {
        self.units.get_mut(&id).map(|u| &mut u.info)
    }

    /// Mutable access to a player, for staging scenarios.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerInfo> {
        self.players.get_mut(&id)
    }

    /// Remove a unit as if it had died.
    pub fn remove(&mut self, id: UnitId) -> Option<UnitInfo> {
        let unit = self.units.remove(&id)?;
        let mut info = unit.info;
        info.status.exists = false;
        self.events.push(SandboxEvent::Destroyed(info));
        self.recount_supply(info.owner);
        Some(info)
    }

    /// Jump to a frame.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    /// Set the throttle interval reported to the agent.
    pub fn set_latency_frames(&mut self, frames: u32) {
        self.latency_frames = frames;
    }

    /// Pause or resume.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Mark this match as a replay.
    pub fn set_replay(&mut self, replay: bool) {
        self.replay = replay;
    }

    // ========================================
    // Inspection
    // ========================================

    /// Every `issue` call since the last [`Self::drain_command_log`].
    pub fn command_log(&self) -> &[CommandRecord] {
        &self.commands
    }

    /// Accepted orders issued on the current frame.
    pub fn accepted_this_frame(&self) -> Vec<(UnitId, Order)> {
        self.commands
            .iter()
            .filter(|c| c.frame == self.frame && c.result.is_ok())
            .map(|c| (c.unit, c.order))
            .collect()
    }

    /// Overlays registered so far, expired ones included until the next step.
    pub fn overlays(&self) -> &[ActiveOverlay] {
        &self.overlays
    }

    /// Chat lines sent by the agent.
    pub fn chat_log(&self) -> &[String] {
        &self.chat
    }

    /// Take the command log, leaving it empty.
    pub fn drain_command_log(&mut self) -> Vec<CommandRecord> {
        std::mem::take(&mut self.commands)
    }

    /// Take the chat log, leaving it empty.
    pub fn drain_chat(&mut self) -> Vec<String> {
        std::mem::take(&mut self.chat)
    }

    /// The last rejection, cleared by the next accepted order.
    pub fn last_error(&self) -> Option<CommandError> {
        self.last_error
    }

    /// Number of units currently on the map.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Units of a type owned by a player, complete or not.
    pub fn count_units(&self, owner: PlayerId, unit_type: UnitType) -> usize {
        self.units
            .values()
            .filter(|u| u.info.owner == owner && u.info.unit_type == unit_type)
            .count()
    }

    /// Units owned by a player, larva excluded.
    pub fn army_size(&self, owner: PlayerId) -> usize {
        self.units
            .values()
            .filter(|u| u.info.owner == owner && u.info.unit_type != UnitType::Larva)
            .count()
    }

    /// Hash of the frame, every player and every unit.
    ///
    /// Two sandboxes driven by the same agent with the same seed must hash
    /// identically on every frame.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);
        for player in self.players.values() {
            player.hash(&mut hasher);
        }
        for unit in self.units.values() {
            unit.info.hash(&mut hasher);
            unit.cargo.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Drain events raised outside [`Self::step`] (e.g. by setup spawns).
    pub fn drain_events(&mut self) -> Vec<SandboxEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================
    // Simulation
    // ========================================

    /// Advance one frame and return what happened during it.
    pub fn step(&mut self) -> Vec<SandboxEvent> {
        self.frame += 1;
        let frame = self.frame;
        self.overlays.retain(|o| o.expires_at() > frame);

        let ids: Vec<UnitId> = self.units.keys().copied().collect();
        for id in ids {
            self.advance_unit(id);
        }
        if self.frame % LARVA_INTERVAL == 0 {
            self.spawn_larva();
        }
        std::mem::take(&mut self.events)
    }

    fn advance_unit(&mut self, id: UnitId) {
        // Earlier units in this step may have killed this one.
        let Some(task) = self.units.get(&id).map(|u| u.task) else {
            return;
        };
        match task {
            Task::Idle => {}
            Task::Moving { destination } => {
                if let Some(unit) = self.units.get_mut(&id) {
                    unit.info.position = destination;
                    unit.set_task(Task::Idle);
                }
            }
            Task::ReturningCargo => {
                self.deposit_cargo(id);
                if let Some(unit) = self.units.get_mut(&id) {
                    unit.set_task(Task::Idle);
                }
            }
            Task::Constructing { remaining } => {
                if let Some(unit) = self.units.get_mut(&id) {
                    let next = if remaining <= 1 {
                        Task::Idle
                    } else {
                        Task::Constructing {
                            remaining: remaining - 1,
                        }
                    };
                    unit.set_task(next);
                }
            }
            Task::UnderConstruction { remaining } => {
                if remaining <= 1 {
                    self.complete_structure(id);
                } else if let Some(unit) = self.units.get_mut(&id) {
                    unit.set_task(Task::UnderConstruction {
                        remaining: remaining - 1,
                    });
                }
            }
            Task::Training {
                unit_type,
                remaining,
            } => {
                if remaining <= 1 {
                    self.finish_training(id, unit_type);
                } else if let Some(unit) = self.units.get_mut(&id) {
                    unit.set_task(Task::Training {
                        unit_type,
                        remaining: remaining - 1,
                    });
                }
            }
            Task::Gathering { target, timer } => self.advance_gathering(id, target, timer + 1),
            Task::Attacking { target, cooldown } => self.advance_attack(id, target, cooldown),
        }
    }

    fn advance_gathering(&mut self, id: UnitId, target: UnitId, timer: u32) {
        if !self.units.contains_key(&target) {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.set_task(Task::Idle);
            }
            return;
        }
        if timer == PICKUP_FRAME {
            let mut depleted = None;
            let mut taken = 0;
            if let Some(source) = self.units.get_mut(&target) {
                taken = source.info.resources.min(TRIP_YIELD);
                source.info.resources -= taken;
                if source.info.resources == 0 && source.info.unit_type.is_mineral_field() {
                    depleted = Some(target);
                }
            }
            if let Some(unit) = self.units.get_mut(&id) {
                unit.cargo = taken;
                unit.info.carrying = unit.info.gathering.filter(|_| taken > 0);
            }
            if let Some(field) = depleted {
                self.remove(field);
            }
        }
        if timer >= TRIP_FRAMES {
            self.deposit_cargo(id);
            if let Some(unit) = self.units.get_mut(&id) {
                unit.set_task(Task::Gathering { target, timer: 0 });
            }
        } else if let Some(unit) = self.units.get_mut(&id) {
            unit.set_task(Task::Gathering { target, timer });
        }
    }

    fn advance_attack(&mut self, id: UnitId, target: UnitId, cooldown: u32) {
        if !self.can_attack(id, target) {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.set_task(Task::Idle);
            }
            return;
        }
        let Some(attacker_type) = self.units.get(&id).map(|u| u.info.unit_type) else {
            return;
        };
        if cooldown > 0 {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.set_task(Task::Attacking {
                    target,
                    cooldown: cooldown - 1,
                });
            }
            return;
        }
        let mut killed = false;
        if let Some(victim) = self.units.get_mut(&target) {
            victim.info.hit_points = victim
                .info
                .hit_points
                .saturating_sub(attacker_type.ground_damage());
            killed = victim.info.hit_points == 0;
        }
        if killed {
            self.remove(target);
        }
        if let Some(unit) = self.units.get_mut(&id) {
            unit.set_task(Task::Attacking {
                target,
                cooldown: attacker_type.attack_cooldown(),
            });
        }
    }

    fn deposit_cargo(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let Some(kind) = unit.info.carrying.take() else {
            return;
        };
        let amount = std::mem::take(&mut unit.cargo);
        let owner = unit.info.owner;
        if let Some(player) = self.players.get_mut(&owner) {
            match kind {
                ResourceKind::Minerals => player.minerals += amount,
                ResourceKind::Gas => player.gas += amount,
            }
        }
    }

    fn complete_structure(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        unit.info.status.completed = true;
        unit.info.hit_points = unit.info.unit_type.max_hit_points();
        unit.set_task(Task::Idle);
        let owner = unit.info.owner;
        self.events.push(SandboxEvent::Completed(id));
        self.recount_supply(owner);
    }

    fn finish_training(&mut self, producer: UnitId, unit_type: UnitType) {
        let Some(unit) = self.units.get_mut(&producer) else {
            return;
        };
        unit.set_task(Task::Idle);
        let owner = unit.info.owner;
        let origin = unit.info.position;
        let is_larva = unit.info.unit_type == UnitType::Larva;

        if is_larva {
            // The larva becomes the new unit; the id is kept, as the host
            // reports a morph rather than a new unit.
            unit.info.unit_type = unit_type;
            unit.info.hit_points = unit_type.max_hit_points();
            self.events.push(SandboxEvent::Morphed(producer));
            self.recount_supply(owner);
        } else {
            let position = Position::new(origin.x, origin.y + 64).make_valid(self.map_size);
            let spawned = self.spawn(owner, unit_type, position);
            self.events.push(SandboxEvent::Completed(spawned));
        }
    }

    fn spawn_larva(&mut self) {
        let hatcheries: Vec<(PlayerId, Position)> = self
            .units
            .values()
            .filter(|u| u.info.unit_type == UnitType::Hatchery && u.info.status.completed)
            .map(|u| (u.info.owner, u.info.position))
            .collect();
        for (owner, position) in hatcheries {
            let hatchery_count = self.count_units(owner, UnitType::Hatchery);
            if self.count_units(owner, UnitType::Larva) >= hatchery_count * MAX_LARVA_PER_HATCHERY {
                continue;
            }
            let spot = Position::new(position.x, position.y + 56).make_valid(self.map_size);
            self.spawn(owner, UnitType::Larva, spot);
        }
    }

    fn recount_supply(&mut self, owner: PlayerId) {
        if owner == PlayerId::NEUTRAL {
            return;
        }
        let mut total = 0;
        let mut used = 0;
        for unit in self.units.values().filter(|u| u.info.owner == owner) {
            if unit.info.status.completed {
                total += unit.info.unit_type.supply_provided();
            }
            used += unit.info.unit_type.supply_required();
            if let Task::Training { unit_type, .. } = unit.task {
                used += unit_type.supply_required();
            }
        }
        if let Some(player) = self.players.get_mut(&owner) {
            player.supply_total = total.min(SUPPLY_LIMIT);
            player.supply_used = used;
        }
    }

    // ========================================
    // Order handling
    // ========================================

    fn apply_order(&mut self, unit: UnitId, order: Order) -> Result<(), CommandError> {
        let actor = self
            .units
            .get(&unit)
            .map(|u| u.info)
            .ok_or(CommandError::UnitDoesNotExist)?;
        if Some(actor.owner) != self.me {
            return Err(CommandError::UnitNotOwned);
        }
        let status = actor.status;
        if status.locked_down
            || status.maelstrommed
            || status.stasised
            || status.loaded
            || status.stuck
            || !status.powered
            || !status.completed
        {
            return Err(CommandError::UnitBusy);
        }
        match order {
            Order::Attack(target) => self.order_attack(&actor, target),
            Order::Build(unit_type, anchor) => self.order_build(&actor, unit_type, anchor),
            Order::Gather(target) => self.order_gather(&actor, target),
            Order::ReturnCargo => self.order_return_cargo(&actor),
            Order::Train(unit_type) => self.order_train(&actor, unit_type),
            Order::Move(destination) => self.order_move(&actor, destination),
        }
    }

    fn set_task(&mut self, id: UnitId, task: Task) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.set_task(task);
        }
    }

    fn order_attack(&mut self, actor: &UnitInfo, target: UnitId) -> Result<(), CommandError> {
        if !self.units.contains_key(&target) {
            return Err(CommandError::UnitDoesNotExist);
        }
        if !self.can_attack(actor.id, target) {
            return Err(CommandError::UnableToHit);
        }
        self.set_task(actor.id, Task::Attacking { target, cooldown: 0 });
        Ok(())
    }

    fn check_affordable(&self, owner: PlayerId, unit_type: UnitType) -> Result<(), CommandError> {
        let player = self.players.get(&owner).ok_or(CommandError::UnitNotOwned)?;
        if player.minerals < unit_type.mineral_price() {
            return Err(CommandError::InsufficientMinerals);
        }
        if player.gas < unit_type.gas_price() {
            return Err(CommandError::InsufficientGas);
        }
        Ok(())
    }

    fn charge(&mut self, owner: PlayerId, unit_type: UnitType) {
        if let Some(player) = self.players.get_mut(&owner) {
            player.minerals -= unit_type.mineral_price();
            player.gas -= unit_type.gas_price();
        }
    }

    fn order_build(
        &mut self,
        actor: &UnitInfo,
        unit_type: UnitType,
        anchor: TilePosition,
    ) -> Result<(), CommandError> {
        if !unit_type.is_building() || unit_type.what_builds() != Some(actor.unit_type) {
            return Err(CommandError::IncompatibleUnitType);
        }
        if actor.status.constructing {
            return Err(CommandError::UnitBusy);
        }
        self.check_affordable(actor.owner, unit_type)?;
        if !self.can_build_at(unit_type, anchor) {
            return Err(CommandError::UnbuildableLocation);
        }
        self.charge(actor.owner, unit_type);

        let geyser = if unit_type.is_refinery() {
            self.geyser_at(anchor)
        } else {
            None
        };
        let site = self.spawn_incomplete(actor.owner, unit_type, anchor);
        if let Some(geyser) = geyser {
            let resources = self.units.get(&geyser).map_or(0, |g| g.info.resources);
            self.units.remove(&geyser);
            if let Some(refinery) = self.units.get_mut(&site) {
                refinery.info.resources = resources;
            }
        }

        match actor.unit_type.race() {
            Some(Race::Terran) => self.set_task(
                actor.id,
                Task::Constructing {
                    remaining: unit_type.build_time(),
                },
            ),
            Some(Race::Zerg) => {
                // The drone turns into the structure.
                self.units.remove(&actor.id);
                self.events.push(SandboxEvent::Morphed(site));
                self.recount_supply(actor.owner);
            }
            _ => self.set_task(actor.id, Task::Idle),
        }
        Ok(())
    }

    fn order_train(&mut self, actor: &UnitInfo, unit_type: UnitType) -> Result<(), CommandError> {
        let producer = actor.unit_type;
        let depot_worker = producer.is_resource_depot()
            && producer.race().map(Race::worker) == Some(unit_type);
        if unit_type.what_builds() != Some(producer) && !depot_worker {
            return Err(CommandError::IncompatibleUnitType);
        }
        let busy = self
            .units
            .get(&actor.id)
            .is_some_and(|u| matches!(u.task, Task::Training { .. }));
        if busy {
            return Err(CommandError::UnitBusy);
        }
        self.check_affordable(actor.owner, unit_type)?;
        let player = self.players.get(&actor.owner).ok_or(CommandError::UnitNotOwned)?;
        if player.supply_used + unit_type.supply_required() > player.supply_total {
            return Err(CommandError::InsufficientSupply);
        }
        self.charge(actor.owner, unit_type);
        self.set_task(
            actor.id,
            Task::Training {
                unit_type,
                remaining: unit_type.build_time(),
            },
        );
        self.recount_supply(actor.owner);
        Ok(())
    }

    fn order_gather(&mut self, actor: &UnitInfo, target: UnitId) -> Result<(), CommandError> {
        if !actor.unit_type.is_worker() {
            return Err(CommandError::IncompatibleUnitType);
        }
        let source = self
            .units
            .get(&target)
            .map(|u| u.info)
            .ok_or(CommandError::UnitDoesNotExist)?;
        let kind = if source.unit_type.is_mineral_field() && source.resources > 0 {
            ResourceKind::Minerals
        } else if source.unit_type.is_refinery()
            && source.owner == actor.owner
            && source.status.completed
        {
            ResourceKind::Gas
        } else {
            return Err(CommandError::InvalidTarget);
        };
        if let Some(unit) = self.units.get_mut(&actor.id) {
            unit.set_task(Task::Gathering { target, timer: 0 });
            unit.info.gathering = Some(kind);
        }
        Ok(())
    }

    fn order_return_cargo(&mut self, actor: &UnitInfo) -> Result<(), CommandError> {
        if !actor.unit_type.is_worker() {
            return Err(CommandError::IncompatibleUnitType);
        }
        if actor.carrying.is_none() {
            return Err(CommandError::NotCarryingCargo);
        }
        let has_depot = self.units.values().any(|u| {
            u.info.owner == actor.owner
                && u.info.unit_type.is_resource_depot()
                && u.info.status.completed
        });
        if !has_depot {
            return Err(CommandError::InvalidTarget);
        }
        self.set_task(actor.id, Task::ReturningCargo);
        Ok(())
    }

    fn order_move(&mut self, actor: &UnitInfo, destination: Position) -> Result<(), CommandError> {
        if actor.unit_type.is_building() {
            return Err(CommandError::IncompatibleUnitType);
        }
        if !destination.is_valid(self.map_size) {
            return Err(CommandError::InvalidParameter);
        }
        self.set_task(actor.id, Task::Moving { destination });
        Ok(())
    }

    // ========================================
    // Placement
    // ========================================

    /// Whether the controlled player can see `unit`. Observers see everything.
    fn is_visible(&self, unit: &UnitInfo) -> bool {
        let Some(me) = self.me else {
            return true;
        };
        if unit.owner == me || unit.owner == PlayerId::NEUTRAL {
            return true;
        }
        let range = i64::from(SIGHT_RANGE) * i64::from(SIGHT_RANGE);
        self.units.values().any(|u| {
            u.info.owner == me && u.info.position.distance_squared(unit.position) <= range
        })
    }

    fn geyser_at(&self, anchor: TilePosition) -> Option<UnitId> {
        self.units
            .values()
            .find(|u| u.info.unit_type.is_vespene_geyser() && u.info.tile_position() == anchor)
            .map(|u| u.info.id)
    }

    /// Whether `unit_type` may be placed with its footprint at `anchor`.
    pub fn can_build_at(&self, unit_type: UnitType, anchor: TilePosition) -> bool {
        let size = unit_type.tile_size();
        if !anchor.footprint_fits(size, self.map_size) {
            return false;
        }
        if unit_type.is_refinery() {
            return self.geyser_at(anchor).is_some();
        }
        !self.units.values().any(|u| {
            let other = u.info.unit_type;
            (other.is_building() || other.is_resource())
                && anchor.footprints_overlap(size, u.info.tile_position(), other.tile_size())
        })
    }
}

fn ring(center: TilePosition, radius: i32) -> impl Iterator<Item = TilePosition> {
    (-radius..=radius).flat_map(move |dy| {
        (-radius..=radius).filter_map(move |dx| {
            (dx.abs() == radius || dy.abs() == radius)
                .then_some(TilePosition::new(center.x + dx, center.y + dy))
        })
    })
}

impl GameHost for SandboxGame {
    fn frame_count(&self) -> u32 {
        self.frame
    }

    fn latency_frames(&self) -> u32 {
        self.latency_frames
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn average_fps(&self) -> f64 {
        f64::from(self.fps)
    }

    fn is_replay(&self) -> bool {
        self.replay
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn map_name(&self) -> String {
        self.map_name.clone()
    }

    fn map_size(&self) -> TilePosition {
        self.map_size
    }

    fn self_player(&self) -> Option<PlayerInfo> {
        self.me.and_then(|id| self.players.get(&id).cloned())
    }

    fn enemy(&self) -> Option<PlayerInfo> {
        self.players
            .values()
            .find(|p| Some(p.id) != self.me && !p.is_neutral && !p.is_observer)
            .cloned()
    }

    fn players(&self) -> Vec<PlayerInfo> {
        self.players.values().cloned().collect()
    }

    fn player(&self, id: PlayerId) -> Option<PlayerInfo> {
        self.players.get(&id).cloned()
    }

    fn own_units(&self) -> Vec<UnitId> {
        let Some(me) = self.me else {
            return Vec::new();
        };
        self.units
            .values()
            .filter(|u| u.info.owner == me)
            .map(|u| u.info.id)
            .collect()
    }

    fn unit(&self, id: UnitId) -> Option<UnitInfo> {
        self.units.get(&id).map(|u| u.info)
    }

    fn closest_unit(&self, from: UnitId, filter: &dyn Fn(&UnitInfo) -> bool) -> Option<UnitInfo> {
        let origin = self.units.get(&from)?.info.position;
        self.units
            .values()
            .map(|u| u.info)
            .filter(|info| {
                // Units inside a transport are off the map.
                info.id != from
                    && info.status.exists
                    && !info.status.loaded
                    && self.is_visible(info)
                    && filter(info)
            })
            .min_by_key(|info| (info.position.distance_squared(origin), info.id))
    }

    fn can_attack(&self, attacker: UnitId, target: UnitId) -> bool {
        let (Some(attacker), Some(target)) = (self.units.get(&attacker), self.units.get(&target))
        else {
            return false;
        };
        let (attacker, target) = (attacker.info, target.info);
        attacker.unit_type.can_attack()
            && target.owner != attacker.owner
            && target.owner != PlayerId::NEUTRAL
            && (!target.unit_type.is_flyer() || attacker.unit_type.can_attack_air())
    }

    fn incomplete_unit_count(&self, unit_type: UnitType) -> u32 {
        let Some(me) = self.me else {
            return 0;
        };
        self.units
            .values()
            .filter(|u| u.info.owner == me)
            .filter(|u| {
                let pending_structure = u.info.unit_type == unit_type && !u.info.status.completed;
                let in_training =
                    matches!(u.task, Task::Training { unit_type: t, .. } if t == unit_type);
                pending_structure || in_training
            })
            .count() as u32
    }

    fn build_location(&self, unit_type: UnitType, near: TilePosition) -> Option<TilePosition> {
        if unit_type.is_refinery() {
            return self
                .units
                .values()
                .filter(|u| u.info.unit_type.is_vespene_geyser())
                .map(|u| u.info.tile_position())
                .min_by_key(|t| {
                    let (dx, dy) = (t.x - near.x, t.y - near.y);
                    (dx * dx + dy * dy, *t)
                });
        }
        (0..=MAX_BUILD_SEARCH_RADIUS)
            .flat_map(|radius| ring(near, radius))
            .find(|&candidate| self.can_build_at(unit_type, candidate))
    }

    fn issue(&mut self, unit: UnitId, order: Order) -> Result<(), CommandError> {
        let result = self.apply_order(unit, order);
        self.last_error = result.err();
        self.commands.push(CommandRecord {
            frame: self.frame,
            unit,
            order,
            result,
        });
        result
    }

    fn send_text(&mut self, text: &str) {
        self.chat.push(text.to_string());
    }

    fn register_overlay(&mut self, overlay: Overlay, frames: u32) {
        self.overlays.push(ActiveOverlay {
            overlay,
            registered_at: self.frame,
            frames,
        });
    }
}
