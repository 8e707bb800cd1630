//! Per-frame dispatch.
//!
//! Once every latency window the dispatcher walks the controlled player's
//! units and routes each eligible one:
//!
//! - workers go through the [`LayerStack`];
//! - idle resource depots try to train a worker, and a failed train is
//!   drawn on the map and handed to [`SupplyRemediation`].
//!
//! Everything else is left alone.

use tracing::debug;

use crate::config::AgentConfig;
use crate::error::CommandError;
use crate::host::{Color, GameHost, Order, Overlay, UnitId, UnitInfo};
use crate::layers::{LayerContext, LayerDecision, LayerStack};
use crate::remediation::{RemediationOutcome, SupplyRemediation};
use crate::rng::RandomSource;

/// Why a whole frame was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSkip {
    /// Watching a replay.
    Replay,
    /// Match paused.
    Paused,
    /// No controlled player.
    NoSelf,
    /// Not on a latency boundary.
    Throttled,
}

/// Why a unit was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    /// The unit is gone.
    Missing,
    /// Locked down, maelstrommed or in stasis.
    Disabled,
    /// Inside a transport.
    Loaded,
    /// An unpowered structure.
    Unpowered,
    /// Cannot path.
    Stuck,
    /// Not finished, or busy constructing.
    Incomplete,
}

/// Check whether a unit may be given orders this frame.
///
/// # Errors
/// Returns the first failing check, in the order listed on [`Ineligible`].
pub fn eligibility(unit: &UnitInfo) -> Result<(), Ineligible> {
    let status = &unit.status;
    if !status.exists {
        return Err(Ineligible::Missing);
    }
    if status.locked_down || status.maelstrommed || status.stasised {
        return Err(Ineligible::Disabled);
    }
    if status.loaded {
        return Err(Ineligible::Loaded);
    }
    if !status.powered {
        return Err(Ineligible::Unpowered);
    }
    if status.stuck {
        return Err(Ineligible::Stuck);
    }
    if !status.completed || status.constructing {
        return Err(Ineligible::Incomplete);
    }
    Ok(())
}

/// Whether the agent acts on the host's current frame.
///
/// A latency of 0 is treated as 1.
pub fn frame_skip(host: &dyn GameHost) -> Option<FrameSkip> {
    if host.is_replay() {
        return Some(FrameSkip::Replay);
    }
    if host.is_paused() {
        return Some(FrameSkip::Paused);
    }
    if host.self_player().is_none() {
        return Some(FrameSkip::NoSelf);
    }
    if host.frame_count() % host.latency_frames().max(1) != 0 {
        return Some(FrameSkip::Throttled);
    }
    None
}

/// What happened on one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Host frame.
    pub frame: u32,
    /// Set when the whole frame was skipped.
    pub skipped: Option<FrameSkip>,
    /// Units skipped by the eligibility filter.
    pub ineligible: Vec<(UnitId, Ineligible)>,
    /// Workers that some layer handled.
    pub decisions: Vec<(UnitId, LayerDecision)>,
    /// Workers no layer could handle.
    pub unhandled_workers: Vec<UnitId>,
    /// Depots that accepted a worker train order.
    pub trained: Vec<UnitId>,
    /// Depots whose train order was refused.
    pub train_failures: Vec<(UnitId, CommandError)>,
    /// Remediation outcomes, one per train failure.
    pub remediation: Vec<RemediationOutcome>,
}

impl FrameReport {
    fn skipped(frame: u32, reason: FrameSkip) -> Self {
        Self {
            frame,
            skipped: Some(reason),
            ..Self::default()
        }
    }

    /// Number of orders this frame that the host accepted.
    #[must_use]
    pub fn orders_issued(&self) -> usize {
        let layer_orders = self
            .decisions
            .iter()
            .filter(|(_, d)| matches!(d.outcome, crate::layers::LayerOutcome::Issued(_)))
            .count();
        let remediation_orders = self.remediation.iter().filter(|r| r.issued()).count();
        layer_orders + self.trained.len() + remediation_orders
    }
}

/// Routes units to their behaviour each frame.
#[derive(Debug)]
pub struct FrameDispatcher {
    config: AgentConfig,
    layers: LayerStack,
    remediation: SupplyRemediation,
}

impl FrameDispatcher {
    /// Dispatcher with layers in the order `config.layers` lists.
    #[must_use]
    pub fn new(config: AgentConfig) -> Self {
        let layers = LayerStack::from_kinds(&config.layers);
        Self::with_layers(config, layers)
    }

    /// Dispatcher with a hand-built layer stack.
    #[must_use]
    pub fn with_layers(config: AgentConfig, layers: LayerStack) -> Self {
        Self {
            config,
            layers,
            remediation: SupplyRemediation::new(),
        }
    }

    /// Active config.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The worker layers.
    #[must_use]
    pub const fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Remediation cooldown state.
    #[must_use]
    pub const fn remediation(&self) -> &SupplyRemediation {
        &self.remediation
    }

    /// Run one frame.
    pub fn on_frame(&mut self, host: &mut dyn GameHost, rng: &mut dyn RandomSource) -> FrameReport {
        let frame = host.frame_count();
        if let Some(reason) = frame_skip(host) {
            return FrameReport::skipped(frame, reason);
        }
        let mut report = FrameReport {
            frame,
            ..FrameReport::default()
        };

        for id in host.own_units() {
            // Earlier orders this frame may have consumed the unit.
            let Some(unit) = host.unit(id) else {
                report.ineligible.push((id, Ineligible::Missing));
                continue;
            };
            if let Err(reason) = eligibility(&unit) {
                debug!(unit = %id, ?reason, "Skipping unit");
                report.ineligible.push((id, reason));
                continue;
            }

            if unit.unit_type.is_worker() {
                let mut ctx = LayerContext {
                    host: &mut *host,
                    rng: &mut *rng,
                    config: &self.config,
                };
                match self.layers.run(&mut ctx, &unit) {
                    Some(decision) => report.decisions.push((id, decision)),
                    None => report.unhandled_workers.push(id),
                }
            } else if unit.unit_type.is_resource_depot() && unit.is_idle() {
                self.train_worker(host, &unit, &mut report);
            }
        }
        report
    }

    fn train_worker(&mut self, host: &mut dyn GameHost, depot: &UnitInfo, report: &mut FrameReport) {
        let Some(race) = depot.unit_type.race() else {
            return;
        };
        match host.issue(depot.id, Order::Train(race.worker())) {
            Ok(()) => report.trained.push(depot.id),
            Err(error) => {
                let window = host.latency_frames().max(1);
                host.register_overlay(
                    Overlay::MapText {
                        position: depot.position,
                        color: Color::White,
                        text: error.to_string(),
                    },
                    window,
                );
                report.train_failures.push((depot.id, error));
                let outcome = self
                    .remediation
                    .on_train_failure(host, depot, error, &self.config);
                report.remediation.push(outcome);
            }
        }
    }
}
