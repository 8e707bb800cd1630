//! Headless match execution.
//!
//! Drives a [`BrooksAgent`] against a [`SandboxGame`] built from a
//! [`Scenario`]: every frame the agent's `on_frame` hook runs, the sandbox
//! steps, and the unit events it raises are forwarded to the matching
//! agent hooks. The match ends when the frame budget runs out or the
//! opponent has nothing left.

use std::time::Instant;

use brooks_core::config::AgentConfig;
use brooks_core::host::{GameHost, PlayerId};
use brooks_core::module::{AgentModule, BrooksAgent, FRAMES_PER_SECOND};
use brooks_core::sandbox::{SandboxEvent, SandboxGame};
use tracing::{debug, info};

use crate::metrics::{MatchMetrics, MetricsCollector};
use crate::scenario::{Scenario, ScenarioError};

/// Frames between progress log lines (one game minute).
const PROGRESS_INTERVAL: u32 = FRAMES_PER_SECOND * 60;

/// Configuration for a single match.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Match identifier for tracking.
    pub match_id: String,
    /// Seed for the agent's random source.
    pub seed: u64,
    /// Starting state.
    pub scenario: Scenario,
    /// Agent tuning.
    pub agent: AgentConfig,
    /// Overrides the scenario's frame budget when set.
    pub max_frames: Option<u32>,
}

impl MatchConfig {
    /// Match of `scenario` with the default agent.
    #[must_use]
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        Self {
            match_id: format!("match_{seed}"),
            seed,
            scenario,
            agent: AgentConfig::default(),
            max_frames: None,
        }
    }

    /// Use a tuned agent.
    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Cap the match length.
    pub fn with_max_frames(mut self, frames: u32) -> Self {
        self.max_frames = Some(frames);
        self
    }

    fn frame_budget(&self) -> u32 {
        self.max_frames.unwrap_or(self.scenario.max_frames)
    }
}

/// A match in progress: the sandbox, the agent and the collector.
#[derive(Debug)]
pub struct MatchRunner {
    game: SandboxGame,
    me: PlayerId,
    agent: BrooksAgent,
    collector: MetricsCollector,
    max_frames: u32,
}

impl MatchRunner {
    /// Build the sandbox and start the agent.
    pub fn new(config: &MatchConfig) -> Result<Self, ScenarioError> {
        config.agent.validate()?;
        let (mut game, me) = config.scenario.build_sandbox()?;
        let mut agent = BrooksAgent::new(config.agent.clone(), config.seed);
        agent.on_start(&mut game);
        Ok(Self {
            game,
            me,
            agent,
            collector: MetricsCollector::new(&config.match_id, &config.scenario.name, config.seed, me),
            max_frames: config.frame_budget(),
        })
    }

    /// The sandbox as it stands.
    #[must_use]
    pub fn game(&self) -> &SandboxGame {
        &self.game
    }

    /// Whether every opponent has lost all its units.
    #[must_use]
    pub fn opponents_eliminated(&self) -> bool {
        let mut opponents = self
            .game
            .players()
            .into_iter()
            .filter(|p| !p.is_neutral && !p.is_observer && p.id != self.me)
            .peekable();
        opponents.peek().is_some() && opponents.all(|p| self.game.army_size(p.id) == 0)
    }

    /// Whether the match should stop.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.game.frame_count() >= self.max_frames || self.opponents_eliminated()
    }

    /// Run the agent for one frame and advance the sandbox.
    pub fn step(&mut self) {
        self.agent.on_frame(&mut self.game);
        self.collector.record_frame(self.agent.last_report());
        self.flush_logs();

        let events = self.game.step();
        for event in &events {
            self.collector.record_event(&self.game, event);
            self.forward(event);
        }

        let frame = self.game.frame_count();
        if frame % PROGRESS_INTERVAL == 0 {
            let me = self.game.self_player();
            debug!(
                frame,
                workers = me.as_ref().map(|p| self.game.count_units(p.id, p.race.worker())),
                supply_used = me.as_ref().map(|p| p.supply_used),
                supply_total = me.as_ref().map(|p| p.supply_total),
                "Match progress"
            );
        }
    }

    /// Move the sandbox's command and chat logs into the metrics.
    fn flush_logs(&mut self) {
        self.collector.record_commands(&self.game.drain_command_log());
        self.collector.record_chat(&self.game.drain_chat());
    }

    fn forward(&mut self, event: &SandboxEvent) {
        let game = &mut self.game;
        match event {
            SandboxEvent::Created(id) => {
                if let Some(unit) = game.unit(*id) {
                    self.agent.on_unit_create(game, &unit);
                }
            }
            SandboxEvent::Completed(id) => {
                if let Some(unit) = game.unit(*id) {
                    self.agent.on_unit_complete(game, &unit);
                }
            }
            SandboxEvent::Morphed(id) => {
                if let Some(unit) = game.unit(*id) {
                    self.agent.on_unit_morph(game, &unit);
                }
            }
            SandboxEvent::Destroyed(unit) => self.agent.on_unit_destroy(game, unit),
        }
    }

    /// Step until the match is over, then end it.
    pub fn run_to_end(mut self) -> MatchMetrics {
        while !self.is_over() {
            self.step();
        }
        let is_winner = self.opponents_eliminated();
        self.agent.on_end(&mut self.game, is_winner);
        self.flush_logs();
        self.collector.finalize(&self.game, is_winner)
    }
}

/// Run a complete match.
pub fn run_match(config: &MatchConfig) -> Result<MatchMetrics, ScenarioError> {
    let started = Instant::now();
    info!(
        match_id = %config.match_id,
        seed = config.seed,
        max_frames = config.frame_budget(),
        scenario = %config.scenario.name,
        "Starting match"
    );

    let metrics = MatchRunner::new(config)?.run_to_end();

    info!(
        match_id = %config.match_id,
        frames = metrics.frames,
        commands = metrics.total_commands(),
        workers = metrics.final_economy.workers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Match finished"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brooks_core::host::OrderKind;
    use brooks_core::unit_type::{Race, UnitType};

    #[test]
    fn test_match_respects_frame_budget() {
        let config = MatchConfig::new(Scenario::standard(Race::Terran), 3).with_max_frames(120);
        let metrics = run_match(&config).expect("match");
        assert_eq!(metrics.frames, 120);
        assert!(!metrics.is_winner);
        assert!(metrics.commands.get(&OrderKind::Gather).copied().unwrap_or(0) >= 4);
    }

    #[test]
    fn test_start_hook_runs() {
        let runner = MatchRunner::new(&MatchConfig::new(Scenario::standard(Race::Protoss), 1)).expect("runner");
        assert_eq!(runner.game().chat_log(), ["Hello world!".to_string()]);
    }

    #[test]
    fn test_step_moves_logs_into_metrics() {
        let mut runner = MatchRunner::new(&MatchConfig::new(Scenario::standard(Race::Terran), 2)).expect("runner");
        for _ in 0..48 {
            runner.step();
            assert!(runner.game().command_log().is_empty());
            assert!(runner.game().chat_log().is_empty());
        }
        let metrics = runner.collector.current();
        assert!(metrics.total_commands() > 0);
        assert_eq!(metrics.chat_lines, 1);
    }

    #[test]
    fn test_match_ends_when_opponent_is_gone() {
        let mut scenario = Scenario::standard(Race::Zerg);
        scenario.players[1].buildings.clear();
        let metrics = run_match(&MatchConfig::new(scenario, 5)).expect("match");
        assert!(metrics.is_winner);
        assert_eq!(metrics.frames, 0);
    }

    #[test]
    fn test_workers_grow_over_a_few_minutes() {
        let config = MatchConfig::new(Scenario::standard(Race::Terran), 11).with_max_frames(24 * 60 * 3);
        let metrics = run_match(&config).expect("match");
        assert!(metrics.workers_trained > 0);
        assert!(metrics.final_economy.workers > 4);
        assert!(metrics.final_economy.supply_total >= UnitType::CommandCenter.supply_provided());
    }

    #[test]
    fn test_invalid_agent_config_is_rejected() {
        let agent = AgentConfig {
            prefer_gas_chance: 2.0,
            ..AgentConfig::default()
        };
        let config = MatchConfig::new(Scenario::standard(Race::Terran), 1).with_agent(agent);
        assert!(matches!(run_match(&config), Err(ScenarioError::Agent(_))));
    }
}
