//! Headless Brooks agent runner.
//!
//! Plays the worker agent against the sandbox without a game client.
//!
//! # Usage
//!
//! ```bash
//! # Play one match
//! cargo run -p brooks_headless -- run --scenario standard_protoss --seed 1
//!
//! # Run a batch with a tuned agent
//! cargo run -p brooks_headless -- batch --count 200 --agent-config agent.ron --output results/
//!
//! # Summarise saved results
//! cargo run -p brooks_headless -- summary --input results/batch_results.json
//! ```
//!
//! Logs go to stderr; `run` prints its metrics to stdout as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brooks_core::config::AgentConfig;
use brooks_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, BatchResults},
    metrics::BatchSummary,
    runner::{run_match, MatchConfig},
    scenario::{Scenario, ScenarioError},
};

#[derive(Parser)]
#[command(name = "brooks_headless")]
#[command(about = "Headless runner for the Brooks worker agent")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match and print its metrics
    Run {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard_terran")]
        scenario: String,

        /// Agent seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Agent config RON file
        #[arg(short, long)]
        agent_config: Option<PathBuf>,

        /// Frame budget override
        #[arg(long)]
        max_frames: Option<u32>,
    },

    /// Run a batch of matches over consecutive seeds
    Batch {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard_terran")]
        scenario: String,

        /// Number of matches to run
        #[arg(short, long, default_value = "16")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Agent config RON file
        #[arg(short, long)]
        agent_config: Option<PathBuf>,

        /// Frame budget override
        #[arg(long)]
        max_frames: Option<u32>,
    },

    /// Print the summary of saved batch results
    Summary {
        /// Batch results JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Verify the same seed always ends in the same state
    Verify {
        /// Built-in scenario name or RON file
        #[arg(short, long, default_value = "standard_terran")]
        scenario: String,

        /// Agent seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of runs to compare
        #[arg(short, long, default_value = "3")]
        runs: u32,

        /// Frame budget override
        #[arg(long)]
        max_frames: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            agent_config,
            max_frames,
        } => cmd_run(&scenario, seed, agent_config, max_frames),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            agent_config,
            max_frames,
        } => {
            let config = BatchConfig {
                scenario,
                match_count: count,
                parallel_matches: parallel,
                output_dir: output,
                seed_start: seed,
                max_frames,
                agent_config,
            };
            cmd_batch(config);
        }
        Commands::Summary { input } => cmd_summary(&input),
        Commands::Verify {
            scenario,
            seed,
            runs,
            max_frames,
        } => cmd_verify(&scenario, seed, runs, max_frames),
    }
}

fn fatal(context: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!(%error, "{context}");
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn load_inputs(
    scenario: &str,
    agent_config: Option<PathBuf>,
) -> Result<(Scenario, AgentConfig), ScenarioError> {
    let scenario = Scenario::resolve(scenario)?;
    let agent = match agent_config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    Ok((scenario, agent))
}

/// Play a single match
fn cmd_run(scenario: &str, seed: u64, agent_config: Option<PathBuf>, max_frames: Option<u32>) {
    let (scenario, agent) =
        load_inputs(scenario, agent_config).unwrap_or_else(|e| fatal("Cannot load inputs", &e));

    let mut config = MatchConfig::new(scenario, seed).with_agent(agent);
    config.max_frames = max_frames;

    let metrics = run_match(&config).unwrap_or_else(|e| fatal("Match failed", &e));
    match serde_json::to_string_pretty(&metrics) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal("Cannot encode metrics", &e),
    }
}

/// Run a batch of matches
fn cmd_batch(config: BatchConfig) {
    let output = config.output_dir.clone();
    if let Err(e) = std::fs::create_dir_all(&output) {
        fatal(&format!("Cannot create output directory '{}'", output.display()), &e);
    }

    tracing::info!(
        scenario = %config.scenario,
        count = config.match_count,
        parallel = config.parallel_matches,
        seed = config.seed_start,
        output = %output.display(),
        "Batch configuration"
    );

    let results = run_batch(config).unwrap_or_else(|e| fatal("Batch failed", &e));

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        fatal("Failed to save results", &e);
    }

    print_summary(&results.summary);
    if !results.errors.is_empty() {
        eprintln!("\nMATCH FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Match {} (seed {}): {}",
                error.match_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Summarise saved results
fn cmd_summary(input: &std::path::Path) {
    tracing::info!("Loading batch results from: {}", input.display());
    let results = BatchResults::load(input).unwrap_or_else(|e| fatal("Failed to load results", &e));
    eprintln!("Scenario: {}", results.config.scenario);
    print_summary(&results.summary);
}

fn print_summary(summary: &BatchSummary) {
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH SUMMARY");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", summary.total_matches);
    eprintln!("Win rate: {:.1}%", summary.win_rate * 100.0);
    eprintln!("Average frames: {:.0}", summary.avg_frames);
    eprintln!(
        "Workers: {:.1} avg ({}..={})",
        summary.avg_workers, summary.min_workers, summary.max_workers
    );
    eprintln!("Average supply total: {:.1}", summary.avg_supply_total / 2.0);
    eprintln!(
        "Supply blocked in {} matches (first block at frame {})",
        summary.supply_blocked_matches,
        summary
            .avg_first_supply_block
            .map_or_else(|| "-".to_string(), |f| format!("{f:.0}"))
    );
    eprintln!("Average remediation orders: {:.2}", summary.avg_remediation_orders);
    eprintln!("\nLayer decisions:");
    for (layer, count) in &summary.layer_decisions {
        eprintln!("  {layer:?}: {count}");
    }
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32, max_frames: Option<u32>) {
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario,
        seed,
        runs
    );

    let (scenario, agent) =
        load_inputs(scenario, None).unwrap_or_else(|e| fatal("Cannot load inputs", &e));
    match verify_determinism(&scenario, &agent, seed, runs, max_frames) {
        Ok(true) => eprintln!("PASS: All {runs} runs produced identical results"),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => fatal("Verification failed", &e),
    }
}
