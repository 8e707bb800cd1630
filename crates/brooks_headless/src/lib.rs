//! Headless match runner for the Brooks worker agent.
//!
//! This crate plays the agent against the deterministic sandbox from
//! `brooks_core` without any game client attached. This enables:
//!
//! - **Tuning**: Compare agent configs across many seeds
//! - **CI verification**: Check that the agent's economy still develops
//! - **Determinism checks**: The same seed must end in the same state
//!
//! # Example
//!
//! ```bash
//! # Play one match and print its metrics as JSON
//! cargo run -p brooks_headless -- run --scenario standard_zerg --seed 7
//!
//! # Run a batch
//! cargo run -p brooks_headless -- batch --scenario supply_block --count 64 --output results/
//!
//! # Verify determinism
//! cargo run -p brooks_headless -- verify --scenario standard_terran --seed 3 --runs 5
//! ```

pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, EconomySnapshot, MatchMetrics, MetricsCollector};
pub use runner::{run_match, MatchConfig, MatchRunner};
pub use scenario::{Scenario, ScenarioError};
