//! Match metrics collection.
//!
//! A [`MetricsCollector`] watches the agent's frame reports and the
//! sandbox's unit events during a headless match, then folds the command
//! log and final economy into a [`MatchMetrics`]. [`BatchSummary`]
//! aggregates many matches.

use std::collections::BTreeMap;

use brooks_core::config::LayerKind;
use brooks_core::dispatcher::FrameReport;
use brooks_core::host::{GameHost, OrderKind, PlayerId};
use brooks_core::layers::LayerOutcome;
use brooks_core::sandbox::{CommandRecord, SandboxEvent, SandboxGame};
use brooks_core::unit_type::UnitType;
use serde::{Deserialize, Serialize};

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Unique match identifier.
    pub match_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Agent seed.
    pub seed: u64,
    /// Frames simulated.
    pub frames: u32,
    /// Frames the dispatcher skipped outright (replay, pause, throttle).
    pub skipped_frames: u32,
    /// Whether the opponent ran out of units.
    pub is_winner: bool,
    /// Accepted orders by kind.
    pub commands: BTreeMap<OrderKind, u32>,
    /// Orders the host refused.
    pub rejected_orders: u32,
    /// Chat lines the agent sent.
    pub chat_lines: u32,
    /// Layer that handled each worker decision.
    pub layer_decisions: BTreeMap<LayerKind, u32>,
    /// Units skipped by the eligibility filter, summed over frames.
    pub ineligible_skips: u32,
    /// Worker-frames no layer could handle.
    pub unhandled_workers: u32,
    /// Accepted worker train orders.
    pub workers_trained: u32,
    /// Refused worker train orders.
    pub train_failures: u32,
    /// Remediation attempts that stamped the cooldown.
    pub remediation_attempts: u32,
    /// Remediation attempts whose command was accepted.
    pub remediation_orders: u32,
    /// Frame of the first supply-blocked train failure.
    pub first_supply_block: Option<u32>,
    /// Own units that entered the game.
    pub units_created: u32,
    /// Own units that left the game.
    pub units_lost: u32,
    /// Enemy units that left the game.
    pub enemy_units_lost: u32,
    /// Economy at the end of the match.
    pub final_economy: EconomySnapshot,
    /// Final sandbox state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create an empty metrics record.
    #[must_use]
    pub fn new(match_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            match_id: match_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Accepted orders of every kind.
    #[must_use]
    pub fn total_commands(&self) -> u32 {
        self.commands.values().sum()
    }
}

/// The controlled player's economy at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Banked minerals.
    pub minerals: u32,
    /// Banked gas.
    pub gas: u32,
    /// Supply used, half-units.
    pub supply_used: u32,
    /// Supply capacity, half-units.
    pub supply_total: u32,
    /// Workers owned, in training included.
    pub workers: u32,
}

impl EconomySnapshot {
    /// Capture `player`'s economy from the sandbox.
    #[must_use]
    pub fn capture(game: &SandboxGame, player: PlayerId) -> Self {
        let Some(info) = game.player(player) else {
            return Self::default();
        };
        Self {
            minerals: info.minerals,
            gas: info.gas,
            supply_used: info.supply_used,
            supply_total: info.supply_total,
            workers: game.count_units(player, info.race.worker()) as u32,
        }
    }
}

/// Metrics collector that tracks a match as it runs.
#[derive(Debug)]
pub struct MetricsCollector {
    metrics: MatchMetrics,
    me: PlayerId,
}

impl MetricsCollector {
    /// Create a collector for the agent playing `me`.
    #[must_use]
    pub fn new(match_id: &str, scenario: &str, seed: u64, me: PlayerId) -> Self {
        Self {
            metrics: MatchMetrics::new(match_id, scenario, seed),
            me,
        }
    }

    /// Fold in one frame's dispatcher report.
    pub fn record_frame(&mut self, report: &FrameReport) {
        let m = &mut self.metrics;
        m.frames += 1;
        if report.skipped.is_some() {
            m.skipped_frames += 1;
            return;
        }
        m.ineligible_skips += report.ineligible.len() as u32;
        m.unhandled_workers += report.unhandled_workers.len() as u32;
        m.workers_trained += report.trained.len() as u32;
        m.train_failures += report.train_failures.len() as u32;

        for (_, decision) in &report.decisions {
            if matches!(decision.outcome, LayerOutcome::Issued(_) | LayerOutcome::Satisfied) {
                *m.layer_decisions.entry(decision.layer).or_default() += 1;
            }
        }
        for outcome in &report.remediation {
            if outcome.attempted() {
                m.remediation_attempts += 1;
            }
            if outcome.issued() {
                m.remediation_orders += 1;
            }
        }
        if m.first_supply_block.is_none()
            && report
                .train_failures
                .iter()
                .any(|(_, e)| *e == brooks_core::error::CommandError::InsufficientSupply)
        {
            m.first_supply_block = Some(report.frame);
        }
    }

    /// Fold in a sandbox unit event.
    pub fn record_event(&mut self, game: &SandboxGame, event: &SandboxEvent) {
        match event {
            SandboxEvent::Created(id) => {
                if game.unit(*id).is_some_and(|u| u.owner == self.me) {
                    self.metrics.units_created += 1;
                }
            }
            SandboxEvent::Destroyed(unit) => {
                if unit.owner == self.me {
                    self.metrics.units_lost += 1;
                } else if game.is_enemy(unit.owner) && unit.unit_type != UnitType::Larva {
                    self.metrics.enemy_units_lost += 1;
                }
            }
            SandboxEvent::Completed(_) | SandboxEvent::Morphed(_) => {}
        }
    }

    /// Tally issued orders by verdict.
    pub fn record_commands(&mut self, records: &[CommandRecord]) {
        for record in records {
            match record.result {
                Ok(()) => *self.metrics.commands.entry(record.order.kind()).or_default() += 1,
                Err(_) => self.metrics.rejected_orders += 1,
            }
        }
    }

    /// Count chat lines sent.
    pub fn record_chat(&mut self, lines: &[String]) {
        self.metrics.chat_lines += lines.len() as u32;
    }

    /// Finish the match: capture the economy and the state hash.
    #[must_use]
    pub fn finalize(mut self, game: &SandboxGame, is_winner: bool) -> MatchMetrics {
        self.metrics.is_winner = is_winner;
        self.metrics.final_economy = EconomySnapshot::capture(game, self.me);
        self.metrics.final_state_hash = game.state_hash();
        self.metrics
    }

    /// Get current metrics.
    #[must_use]
    pub fn current(&self) -> &MatchMetrics {
        &self.metrics
    }
}

/// Summary statistics across multiple matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches played.
    pub total_matches: u32,
    /// Matches the agent won.
    pub wins: u32,
    /// Wins over matches.
    pub win_rate: f64,
    /// Average frames simulated.
    pub avg_frames: f64,
    /// Average accepted orders per match.
    pub avg_commands: f64,
    /// Average final worker count.
    pub avg_workers: f64,
    /// Fewest final workers.
    pub min_workers: u32,
    /// Most final workers.
    pub max_workers: u32,
    /// Average final supply capacity, half-units.
    pub avg_supply_total: f64,
    /// Average accepted remediation orders per match.
    pub avg_remediation_orders: f64,
    /// Matches that hit a supply block at least once.
    pub supply_blocked_matches: u32,
    /// Average frame of the first supply block, over matches that had one.
    pub avg_first_supply_block: Option<f64>,
    /// Layer decisions summed over every match.
    pub layer_decisions: BTreeMap<LayerKind, u32>,
}

impl BatchSummary {
    /// Calculate summary from a list of match metrics.
    #[must_use]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }
        let count = matches.len() as f64;
        let mean = |f: &dyn Fn(&MatchMetrics) -> f64| matches.iter().map(f).sum::<f64>() / count;

        let wins = matches.iter().filter(|m| m.is_winner).count() as u32;
        let blocks: Vec<u32> = matches.iter().filter_map(|m| m.first_supply_block).collect();

        let mut layer_decisions = BTreeMap::new();
        for m in matches {
            for (layer, n) in &m.layer_decisions {
                *layer_decisions.entry(*layer).or_default() += n;
            }
        }

        Self {
            total_matches: matches.len() as u32,
            wins,
            win_rate: wins as f64 / count,
            avg_frames: mean(&|m| m.frames as f64),
            avg_commands: mean(&|m| m.total_commands() as f64),
            avg_workers: mean(&|m| m.final_economy.workers as f64),
            min_workers: matches.iter().map(|m| m.final_economy.workers).min().unwrap_or(0),
            max_workers: matches.iter().map(|m| m.final_economy.workers).max().unwrap_or(0),
            avg_supply_total: mean(&|m| m.final_economy.supply_total as f64),
            avg_remediation_orders: mean(&|m| m.remediation_orders as f64),
            supply_blocked_matches: blocks.len() as u32,
            avg_first_supply_block: (!blocks.is_empty())
                .then(|| blocks.iter().map(|&f| f as f64).sum::<f64>() / blocks.len() as f64),
            layer_decisions,
        }
    }
}
