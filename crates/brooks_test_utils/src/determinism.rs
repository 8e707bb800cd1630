//! Determinism testing utilities.
//!
//! The agent is deterministic given its random source: the same seed on the
//! same sandbox must produce the same commands on every frame. Sources of
//! non-determinism to watch for:
//!
//! - **System randomness**: layers only draw from the injected
//!   [`RandomSource`](brooks_core::rng::RandomSource).
//! - **Hash iteration order**: the sandbox keeps units in a `BTreeMap`, and
//!   closest-unit ties break on the lowest id.
//! - **Floating point**: only the probability gates use floats, and they
//!   compare values produced bit-identically from the seed.

use brooks_core::config::AgentConfig;
use brooks_core::module::{AgentModule, BrooksAgent};
use brooks_core::sandbox::SandboxGame;
use tracing::warn;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine several times and compare final hashes.
///
/// * `runs` - Number of independent runs
/// * `frames` - Steps per run
/// * `setup` - Builds the initial state
/// * `step` - Advances one frame
/// * `hash` - Hashes the final state
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..frames {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        warn!(?hashes, frames, "Runs diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Drive a fresh [`BrooksAgent`] over the sandbox from `setup` twice and
/// compare the final sandbox hashes.
pub fn verify_agent_determinism<F>(setup: F, config: &AgentConfig, seed: u64, frames: u32) -> DeterminismResult
where
    F: Fn() -> SandboxGame,
{
    verify_determinism(
        2,
        frames,
        || {
            let mut game = setup();
            let mut agent = BrooksAgent::new(config.clone(), seed);
            agent.on_start(&mut game);
            (game, agent)
        },
        |(game, agent)| {
            agent.on_frame(game);
            game.step();
        },
        |(game, _)| game.state_hash(),
    )
}
