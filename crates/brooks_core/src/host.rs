//! The game host interface.
//!
//! The engine owns every unit and player. The agent only ever sees
//! snapshots ([`UnitInfo`], [`PlayerInfo`]) and acts by issuing [`Order`]s
//! through the [`GameHost`] trait. A live engine binding and the in-memory
//! [`SandboxGame`](crate::sandbox::SandboxGame) both implement it, so the
//! decision code never knows which one it is driving.
//!
//! # Command Flow
//!
//! All unit control flows through [`GameHost::issue`]. Commands are
//! synchronous: they either take effect or return a [`CommandError`] before
//! the call returns. There is no queueing and no cancellation.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::position::{Position, TilePosition, TILE_SIZE};
use crate::unit_type::{Race, UnitType};

/// Host-assigned unit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-assigned player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Owner of mineral fields, geysers and other map furniture.
    pub const NEUTRAL: Self = Self(u8::MAX);
}

/// Snapshot of a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Race the player is playing.
    pub race: Race,
    /// Whether this is the neutral player.
    pub is_neutral: bool,
    /// Whether this player only observes.
    pub is_observer: bool,
    /// Supply in use, half-units.
    pub supply_used: u32,
    /// Supply capacity, half-units.
    pub supply_total: u32,
    /// Banked minerals.
    pub minerals: u32,
    /// Banked gas.
    pub gas: u32,
}

/// A harvestable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Mineral crystals.
    Minerals,
    /// Vespene gas.
    Gas,
}

/// Status flags reported for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStatus {
    /// Unit is still in the game and visible to the agent.
    pub exists: bool,
    /// Unit has no order.
    pub idle: bool,
    /// Unit has finished construction or training.
    pub completed: bool,
    /// Worker is busy erecting a structure.
    pub constructing: bool,
    /// Unit is engaging a target.
    pub attacking: bool,
    /// Disabled by a lockdown effect.
    pub locked_down: bool,
    /// Disabled by a maelstrom effect.
    pub maelstrommed: bool,
    /// Frozen in stasis.
    pub stasised: bool,
    /// Inside a transport or bunker.
    pub loaded: bool,
    /// Structure has power (always true for non-Protoss units).
    pub powered: bool,
    /// Unit cannot path anywhere.
    pub stuck: bool,
}

impl UnitStatus {
    /// A completed, idle, unafflicted unit.
    pub const READY: Self = Self {
        exists: true,
        idle: true,
        completed: true,
        constructing: false,
        attacking: false,
        locked_down: false,
        maelstrommed: false,
        stasised: false,
        loaded: false,
        powered: true,
        stuck: false,
    };
}

impl Default for UnitStatus {
    fn default() -> Self {
        Self::READY
    }
}

/// Snapshot of a unit as the host reports it this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitInfo {
    /// Unit identifier.
    pub id: UnitId,
    /// Unit type.
    pub unit_type: UnitType,
    /// Owning player.
    pub owner: PlayerId,
    /// Centre position in pixels.
    pub position: Position,
    /// Current hit points.
    pub hit_points: u32,
    /// Resources left (mineral fields, geysers, refineries).
    pub resources: u32,
    /// Status flags.
    pub status: UnitStatus,
    /// Cargo a worker is carrying.
    pub carrying: Option<ResourceKind>,
    /// Resource a worker is currently harvesting.
    pub gathering: Option<ResourceKind>,
}

impl UnitInfo {
    /// The build tile under this unit.
    ///
    /// For structures and resources this is the top-left tile of the
    /// footprint, which is what construction orders expect.
    #[must_use]
    pub const fn tile_position(&self) -> TilePosition {
        if self.unit_type.is_building() || self.unit_type.is_resource() {
            let size = self.unit_type.tile_size();
            Position::new(
                self.position.x - size.x * TILE_SIZE / 2,
                self.position.y - size.y * TILE_SIZE / 2,
            )
            .to_tile()
        } else {
            self.position.to_tile()
        }
    }

    /// Whether the unit has no order.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.status.idle
    }

    /// Whether the unit is carrying minerals or gas.
    #[must_use]
    pub const fn is_carrying(&self) -> bool {
        self.carrying.is_some()
    }

    /// Whether the unit is harvesting minerals.
    #[must_use]
    pub fn is_gathering_minerals(&self) -> bool {
        self.gathering == Some(ResourceKind::Minerals)
    }

    /// Whether the unit is harvesting gas.
    #[must_use]
    pub fn is_gathering_gas(&self) -> bool {
        self.gathering == Some(ResourceKind::Gas)
    }
}

/// An order the agent can give a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Attack a specific unit.
    Attack(UnitId),
    /// Construct a structure with its top-left corner on a tile.
    Build(UnitType, TilePosition),
    /// Harvest from a mineral field or refinery.
    Gather(UnitId),
    /// Deliver carried resources to the nearest depot.
    ReturnCargo,
    /// Train a unit from this producer.
    Train(UnitType),
    /// Move to a position.
    Move(Position),
}

impl Order {
    /// The kind of this order, without its arguments.
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::Attack(_) => OrderKind::Attack,
            Self::Build(..) => OrderKind::Build,
            Self::Gather(_) => OrderKind::Gather,
            Self::ReturnCargo => OrderKind::ReturnCargo,
            Self::Train(_) => OrderKind::Train,
            Self::Move(_) => OrderKind::Move,
        }
    }
}

/// Argument-free discriminant of [`Order`], used for tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderKind {
    /// [`Order::Attack`].
    Attack,
    /// [`Order::Build`].
    Build,
    /// [`Order::Gather`].
    Gather,
    /// [`Order::ReturnCargo`].
    ReturnCargo,
    /// [`Order::Train`].
    Train,
    /// [`Order::Move`].
    Move,
}

/// Overlay colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// White.
    White,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Red.
    Red,
}

/// Something drawn by the host for a human observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    /// Text anchored at a map position.
    MapText {
        /// Anchor in pixels.
        position: Position,
        /// Text colour.
        color: Color,
        /// Text to draw.
        text: String,
    },
    /// Rectangle outline in map pixels.
    MapBox {
        /// Top-left corner.
        top_left: Position,
        /// Bottom-right corner.
        bottom_right: Position,
        /// Outline colour.
        color: Color,
    },
    /// Text at fixed screen coordinates.
    ScreenText {
        /// Screen x in pixels.
        x: i32,
        /// Screen y in pixels.
        y: i32,
        /// Text to draw.
        text: String,
    },
}

/// Queries and commands the engine exposes to the agent.
///
/// Methods that talk about "self" refer to the player the agent controls.
/// Implementations must answer queries from the same frame the agent is
/// deciding in; they never block.
pub trait GameHost {
    /// Frames elapsed since the match started.
    fn frame_count(&self) -> u32;

    /// Frames between a command being issued and the engine processing it.
    fn latency_frames(&self) -> u32;

    /// Current frames per second.
    fn fps(&self) -> u32;

    /// Average frames per second over the match.
    fn average_fps(&self) -> f64;

    /// Whether the host is playing back a replay.
    fn is_replay(&self) -> bool;

    /// Whether the match is paused.
    fn is_paused(&self) -> bool;

    /// Map file name.
    fn map_name(&self) -> String;

    /// Map dimensions in build tiles.
    fn map_size(&self) -> TilePosition;

    /// The controlled player, `None` when observing.
    fn self_player(&self) -> Option<PlayerInfo>;

    /// The first enemy player, if any.
    fn enemy(&self) -> Option<PlayerInfo>;

    /// Every player in the match, neutral included.
    fn players(&self) -> Vec<PlayerInfo>;

    /// Look up a player.
    fn player(&self, id: PlayerId) -> Option<PlayerInfo>;

    /// Units owned by the controlled player, in a stable order.
    fn own_units(&self) -> Vec<UnitId>;

    /// Snapshot a unit. `None` if the host does not know the id.
    fn unit(&self, id: UnitId) -> Option<UnitInfo>;

    /// The existing unit closest to `from` that satisfies `filter`.
    ///
    /// `from` itself is never returned. Ties resolve to the lowest id.
    fn closest_unit(&self, from: UnitId, filter: &dyn Fn(&UnitInfo) -> bool) -> Option<UnitInfo>;

    /// Whether `attacker` has a weapon able to hit `target`.
    fn can_attack(&self, attacker: UnitId, target: UnitId) -> bool;

    /// Units of `unit_type` the controlled player has in production.
    fn incomplete_unit_count(&self, unit_type: UnitType) -> u32;

    /// A valid construction site for `unit_type` near `near`, if one exists.
    fn build_location(&self, unit_type: UnitType, near: TilePosition) -> Option<TilePosition>;

    /// Issue an order to a unit.
    ///
    /// # Errors
    /// Returns the host's rejection reason when the order is refused.
    fn issue(&mut self, unit: UnitId, order: Order) -> Result<(), CommandError>;

    /// Send a chat line.
    fn send_text(&mut self, text: &str);

    /// Draw an overlay every frame for the next `frames` frames.
    fn register_overlay(&mut self, overlay: Overlay, frames: u32);

    /// Whether `player` is hostile to the controlled player.
    fn is_enemy(&self, player: PlayerId) -> bool {
        match self.self_player() {
            Some(me) => player != me.id && player != PlayerId::NEUTRAL,
            None => false,
        }
    }
}
