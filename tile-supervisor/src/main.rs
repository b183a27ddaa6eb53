/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use tile_supervisor::config::SupervisorConfigManager;
use tile_supervisor::fusion::Ruleset;
use tile_supervisor::readiness::TileReadiness;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Tile supervisor — readiness fusion and poll scheduling core.
///
/// Example:
///   tile-supervisor --config configs/tile_configuration.yaml --dump-rules
#[derive(Debug, Parser)]
#[command(
    name = "tile-supervisor",
    about = "Per-tile readiness fusion and poll scheduling core",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML supervisor configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the command queue capacity from the configuration file.
    #[arg(short = 'q', long = "queue-capacity")]
    queue_capacity: Option<usize>,

    /// Print the validated readiness rule table and exit.
    #[arg(long = "dump-rules", default_value_t = false)]
    dump_rules: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Tile supervisor starting up...");

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    info!(
        config = ?cli.config,
        queue_capacity = ?cli.queue_capacity,
        dump_rules = cli.dump_rules,
        "Configuration"
    );

    // ── Validate the readiness rule table ─────────────────────────────────────
    let ruleset = match Ruleset::builtin() {
        Ok(ruleset) => ruleset,
        Err(e) => {
            error!("Readiness rule table failed validation: {e}");
            process::exit(1);
        }
    };
    info!(rules = ruleset.len(), "Readiness rule table validated");

    if cli.dump_rules {
        for ((stimulus, state), outcome) in ruleset.iter() {
            println!(
                "({stimulus}, {state}) -> {} {:?}",
                outcome.next, outcome.actions
            );
        }
        return;
    }

    // ── Load supervisor configuration ─────────────────────────────────────────
    let mut manager = SupervisorConfigManager::new();

    match &cli.config {
        Some(path) => {
            if let Err(e) = manager.load_from_file(path) {
                error!("Failed to load supervisor configuration: {:#}", e);
                process::exit(1);
            }
        }
        None => {
            warn!("No configuration file provided, using built-in defaults");
        }
    }

    let mut config = manager.into_config();
    if cli.queue_capacity.is_some() {
        config.queue_capacity = cli.queue_capacity;
    }

    // ── Print the effective per-state attribute table ─────────────────────────
    info!(
        thresholds = config.thresholds.len(),
        queue_capacity = ?config.queue_capacity,
        "Effective configuration"
    );
    for state in TileReadiness::ALL {
        let allowed = config.attributes.allowed(state);
        info!(
            "  [{state}]  attributes={allowed:?}",
            state = state,
            allowed = allowed,
        );
    }
}
