//! Batch match runner.
//!
//! Runs many seeds of one scenario in parallel using rayon and summarises
//! how the agent's economy developed across them.

use crate::metrics::{BatchSummary, MatchMetrics};
use crate::runner::{run_match, MatchConfig};
use crate::scenario::{Scenario, ScenarioError};
use brooks_core::config::AgentConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Built-in scenario name or path to a RON scenario
    pub scenario: String,
    /// Number of matches to run
    pub match_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_matches: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Seed of the first match; match `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Frame budget override (None = scenario's own)
    pub max_frames: Option<u32>,
    /// Path to a RON agent config (None = defaults)
    pub agent_config: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "standard_terran".to_string(),
            match_count: 16,
            parallel_matches: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_frames: None,
            agent_config: None,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, match_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            match_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Cap every match at `frames`
    pub fn with_max_frames(mut self, frames: u32) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Load the agent config from a RON file
    pub fn with_agent_config(mut self, path: PathBuf) -> Self {
        self.agent_config = Some(path);
        self
    }

    fn load_agent(&self) -> Result<AgentConfig, ScenarioError> {
        match &self.agent_config {
            Some(path) => Ok(AgentConfig::load(path)?),
            None => Ok(AgentConfig::default()),
        }
    }

    fn match_config(&self, scenario: &Scenario, agent: &AgentConfig, seed: u64) -> MatchConfig {
        let config = MatchConfig::new(scenario.clone(), seed).with_agent(agent.clone());
        match self.max_frames {
            Some(frames) => config.with_max_frames(frames),
            None => config,
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match metrics, in seed order
    pub matches: Vec<MatchMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub match_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total matches
    pub total: u32,
    completed: AtomicU32,
    wins: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            wins: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed match
    pub fn record_completion(&self, is_winner: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if is_winner {
            self.wins.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        self.current() as f64 / self.total.max(1) as f64 * 100.0
    }

    /// Win rate over the matches completed so far
    pub fn current_win_rate(&self) -> f64 {
        let completed = self.current();
        if completed == 0 {
            return 0.0;
        }
        self.wins.load(Ordering::Relaxed) as f64 / completed as f64
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_match = elapsed.as_secs_f64() / completed as f64;
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_match * remaining as f64)
    }
}

/// Run a batch of matches
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, ScenarioError> {
    let start = Instant::now();
    let scenario = Scenario::resolve(&config.scenario)?;
    let agent = config.load_agent()?;
    let progress = BatchProgress::new(config.match_count);

    info!(
        "Starting batch run: {} matches of '{}'",
        config.match_count, scenario.name
    );

    if config.parallel_matches > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_matches as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchMetrics, BatchError>> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(i as u64);
            match run_match(&config.match_config(&scenario, &agent, seed)) {
                Ok(metrics) => {
                    progress.record_completion(metrics.is_winner);
                    let completed = progress.current();
                    if completed % 10 == 0 {
                        debug!(
                            "Progress: {}/{} ({:.0}%, eta {}s)",
                            completed,
                            config.match_count,
                            progress.percentage(),
                            progress.eta().as_secs()
                        );
                    }
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Match {} failed: {}", i, e);
                    Err(BatchError {
                        match_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (matches, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let matches: Vec<MatchMetrics> = matches.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s (win rate {:.1}%)",
        matches.len(),
        duration_seconds,
        progress.current_win_rate() * 100.0
    );

    Ok(BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    })
}

/// Run the same seed `runs` times and check every final state hash matches
pub fn verify_determinism(
    scenario: &Scenario,
    agent: &AgentConfig,
    seed: u64,
    runs: u32,
    max_frames: Option<u32>,
) -> Result<bool, ScenarioError> {
    let config = BatchConfig {
        max_frames,
        ..BatchConfig::default()
    };
    let mut hashes = Vec::with_capacity(runs as usize);
    for _ in 0..runs {
        let metrics = run_match(&config.match_config(scenario, agent, seed))?;
        hashes.push(metrics.final_state_hash);
    }
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !deterministic {
        warn!(seed, ?hashes, "Runs diverged");
    }
    Ok(deterministic)
}
