//! # Brooks Core
//!
//! A worker agent for a host-driven RTS engine, built as a layered
//! (subsumption-style) controller.
//!
//! Every latency window the agent walks its own units. Workers are offered
//! to a fixed priority list of behaviour layers and the first one that acts
//! wins. Idle resource depots train workers, and a supply-blocked train
//! kicks off supply remediation.
//!
//! The engine is reached only through the [`host::GameHost`] trait, and all
//! randomness through [`rng::RandomSource`], so the same code runs against a
//! live engine or the deterministic in-memory [`sandbox::SandboxGame`].
//!
//! ## Crate Structure
//!
//! - [`host`] - Host trait, unit and player snapshots, orders, overlays
//! - [`layers`] - The six worker layers and the ordered stack
//! - [`dispatcher`] - Frame guard, eligibility filter, unit routing
//! - [`remediation`] - Supply remediation state machine
//! - [`module`] - Engine hooks and the agent itself
//! - [`sandbox`] - In-memory host for tests and headless runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod layers;
pub mod module;
pub mod position;
pub mod remediation;
pub mod rng;
pub mod sandbox;
pub mod unit_type;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AgentConfig, LayerKind};
    pub use crate::dispatcher::{FrameDispatcher, FrameReport, FrameSkip, Ineligible};
    pub use crate::error::{AgentError, CommandError, Result};
    pub use crate::host::{
        Color, GameHost, Order, OrderKind, Overlay, PlayerId, PlayerInfo, ResourceKind, UnitId,
        UnitInfo, UnitStatus,
    };
    pub use crate::layers::{Layer, LayerContext, LayerDecision, LayerOutcome, LayerStack};
    pub use crate::module::{AgentModule, BrooksAgent};
    pub use crate::position::{Position, TilePosition};
    pub use crate::remediation::{RemediationOutcome, SupplyRemediation};
    pub use crate::rng::{RandomSource, ScriptedRandom, SeededRandom};
    pub use crate::sandbox::{SandboxEvent, SandboxGame};
    pub use crate::unit_type::{Race, UnitType};
}
