/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Threshold evaluation of monitoring points.
//!
//! [`compute_intermediate_state`] turns one snapshot of monitoring values
//! into a coarse health verdict plus a human-readable report.  It is a pure
//! function — no hidden state, no I/O — and it produces per-tile *raw facts*
//! only; rolling health up across many tiles belongs to a separate consumer.
//!
//! Evaluation contract, in order:
//!
//! 1. any monitored point with no value ⇒ [`HealthState::Unknown`], report
//!    enumerating **every** absent point;
//! 2. else the first point outside its `[min, max]` bound ⇒
//!    [`HealthState::Failed`], report naming that point and the violated
//!    bound;
//! 3. else [`HealthState::Ok`] with an empty report.
//!
//! "First" is deterministic: points are walked in `BTreeMap` (name) order.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

// ── HealthState ───────────────────────────────────────────────────────────────

/// Coarse health verdict for one tile's monitoring snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Every monitored point has a value inside its bounds.
    Ok,
    /// At least one point is outside its bounds.
    Failed,
    /// At least one point has no value, so no verdict can be given.
    Unknown,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HealthState::Ok => "ok",
            HealthState::Failed => "failed",
            HealthState::Unknown => "unknown",
        })
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Inclusive `[min, max]` acceptance range for one monitoring point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `true` when `value` lies inside the inclusive range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Evaluate one monitoring snapshot against its thresholds.
///
/// `points` maps every monitored name to its latest value, or `None` when no
/// valid reading exists (stale, never read, marked invalid).  Names present
/// in `thresholds` but missing from `points` entirely count as absent too.
/// Points without a threshold entry are ignored — not every attribute is
/// health-relevant.
pub fn compute_intermediate_state(
    points: &BTreeMap<String, Option<f64>>,
    thresholds: &BTreeMap<String, Bounds>,
) -> (HealthState, String) {
    // Pass 1: absence dominates — collect every absent point.
    let absent: Vec<&str> = thresholds
        .keys()
        .filter(|name| matches!(points.get(*name), None | Some(None)))
        .map(String::as_str)
        .collect();

    if !absent.is_empty() {
        return (
            HealthState::Unknown,
            format!("no value for monitoring points: {}", absent.join(", ")),
        );
    }

    // Pass 2: first out-of-bounds point (deterministic name order) fails.
    for (name, bounds) in thresholds {
        // Pass 1 guarantees the value is present.
        if let Some(Some(value)) = points.get(name) {
            if !bounds.contains(*value) {
                let report = if *value < bounds.min {
                    format!("{name} = {value} below minimum {}", bounds.min)
                } else {
                    format!("{name} = {value} above maximum {}", bounds.max)
                };
                return (HealthState::Failed, report);
            }
        }
    }

    (HealthState::Ok, String::new())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
