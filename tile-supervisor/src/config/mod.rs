/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Supervisor configuration loading and management.
//!
//! The expected YAML structure is:
//! ```yaml
//! tile:
//!   queue_capacity: 64
//! attributes:
//!   connected: [core_voltage, board_temperature, fpga_temperature]
//!   initialised: [core_voltage, board_temperature, fpga_temperature,
//!                 firmware_version, clock_locked, pps_present]
//! thresholds:
//!   board_temperature: { min: 10.0, max: 68.0 }
//! ```
//!
//! Malformed YAML and unknown readiness names are fatal configuration
//! errors.  A readiness state absent from `attributes` simply has an empty
//! allowed set.  Attribute richness is expected to grow as readiness
//! advances; a configuration that shrinks it mid-ladder is accepted with a
//! warning (expected, not enforced).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::health::Bounds;
use crate::readiness::TileReadiness;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private — callers work with [`SupervisorConfig`] /
/// [`SupervisorConfigManager`] instead.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tile: TileSection,
    #[serde(default)]
    attributes: BTreeMap<TileReadiness, Vec<String>>,
    #[serde(default)]
    thresholds: BTreeMap<String, Bounds>,
}

#[derive(Debug, Default, Deserialize)]
struct TileSection {
    /// Command queue bound; absent means unbounded.
    queue_capacity: Option<usize>,
}

// ── AttributeMap ──────────────────────────────────────────────────────────────

/// Per-readiness allowed monitoring attributes.
///
/// States without an entry have an empty allowed set.  Order within a list
/// is the round-robin order of the attribute lap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    per_state: BTreeMap<TileReadiness, Vec<String>>,
}

impl AttributeMap {
    /// The attribute names meaningful at `readiness`, in lap order.
    pub fn allowed(&self, readiness: TileReadiness) -> &[String] {
        self.per_state
            .get(&readiness)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Builder-style insert; later calls replace earlier ones for the same
    /// state.
    pub fn with(mut self, readiness: TileReadiness, names: &[&str]) -> Self {
        self.per_state
            .insert(readiness, names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// The fallback attribute map used when no configuration file is
    /// supplied: nothing is polled below `Connected`, and richness grows
    /// with readiness.
    pub fn builtin_defaults() -> Self {
        AttributeMap::default()
            .with(
                TileReadiness::Connected,
                &["core_voltage", "board_temperature", "fpga_temperature"],
            )
            .with(
                TileReadiness::Initialised,
                &[
                    "core_voltage",
                    "board_temperature",
                    "fpga_temperature",
                    "firmware_version",
                    "clock_locked",
                    "pps_present",
                ],
            )
            .with(
                TileReadiness::Synchronised,
                &[
                    "core_voltage",
                    "board_temperature",
                    "fpga_temperature",
                    "firmware_version",
                    "clock_locked",
                    "pps_present",
                    "sync_time",
                    "beamformer_frame",
                ],
            )
    }

    /// Warn when a higher readiness state loses attributes a lower one had.
    fn warn_on_shrinking_richness(&self) {
        for pair in TileReadiness::ALL.windows(2) {
            let lower = self.allowed(pair[0]);
            let higher_set = self.allowed(pair[1]);
            // Disabled sits low on the ladder and legitimately polls nothing.
            if pair[1] == TileReadiness::Disabled {
                continue;
            }
            let missing: Vec<&str> = lower
                .iter()
                .filter(|name| !higher_set.contains(name))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                warn!(
                    from = %pair[0],
                    to = %pair[1],
                    missing = ?missing,
                    "attribute richness shrinks as readiness advances"
                );
            }
        }
    }
}

// ── Public configuration ──────────────────────────────────────────────────────

/// Everything the supervisor needs from the configuration file.
#[derive(Debug, Clone, Default)]
pub struct SupervisorConfig {
    /// Per-readiness allowed attribute lists.
    pub attributes: AttributeMap,
    /// `[min, max]` acceptance ranges fed to the health evaluator.
    pub thresholds: BTreeMap<String, Bounds>,
    /// Command queue bound; `None` means unbounded.
    pub queue_capacity: Option<usize>,
}

impl SupervisorConfig {
    /// The fallback configuration used when no file is supplied.
    pub fn builtin_defaults() -> Self {
        let thresholds = [
            ("board_temperature".to_string(), Bounds::new(10.0, 68.0)),
            ("fpga_temperature".to_string(), Bounds::new(10.0, 95.0)),
            ("core_voltage".to_string(), Bounds::new(0.9, 1.05)),
        ]
        .into_iter()
        .collect();

        Self {
            attributes: AttributeMap::builtin_defaults(),
            thresholds,
            queue_capacity: None,
        }
    }
}

// ── SupervisorConfigManager ───────────────────────────────────────────────────

/// Loads and manages the supervisor configuration from a YAML file.
#[derive(Debug, Default)]
pub struct SupervisorConfigManager {
    config: SupervisorConfig,
    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl SupervisorConfigManager {
    /// Creates a manager holding the built-in defaults.
    pub fn new() -> Self {
        Self {
            config: SupervisorConfig::builtin_defaults(),
            loaded: false,
        }
    }

    /// Parses `path` and replaces the held configuration.
    ///
    /// * Sections absent from the file fall back to empty (`attributes`,
    ///   `thresholds`) or unbounded (`queue_capacity`).
    /// * Calling this a second time replaces the previously loaded values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or an `attributes` key is not a readiness
    /// state name.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading supervisor configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let attributes = AttributeMap {
            per_state: file.attributes,
        };
        attributes.warn_on_shrinking_richness();

        for (state, names) in &attributes.per_state {
            debug!(state = %state, attributes = ?names, "attribute set loaded");
        }

        self.config = SupervisorConfig {
            attributes,
            thresholds: file.thresholds,
            queue_capacity: file.tile.queue_capacity,
        };
        self.loaded = true;

        info!(
            attribute_states = self.config.attributes.per_state.len(),
            thresholds = self.config.thresholds.len(),
            queue_capacity = ?self.config.queue_capacity,
            "supervisor configuration loaded"
        );
        Ok(())
    }

    /// The currently held configuration (defaults until a file is loaded).
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Consume the manager and take the configuration.
    pub fn into_config(self) -> SupervisorConfig {
        self.config
    }

    /// `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
