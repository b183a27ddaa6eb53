/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for status fusion.
//!
//! Two error enums model the two failure layers:
//!
//! * [`RulesetError`] — the rule table failed load-time validation; fatal,
//!   the supervisor must not accept traffic.
//! * [`FusionError`] — a defect surfaced while applying a stimulus at
//!   runtime.
//!
//! A recognised stimulus that simply has no rule for the current readiness is
//! **not** an error — [`StatusFusion::apply`](super::StatusFusion::apply)
//! treats that cell as a no-op.  Only a stimulus kind the rule table knows
//! nothing about fails loudly.
//!
//! Every variant carries enough structured data to emit a fully-qualified
//! `tracing` event without re-parsing the message text.  **Do not** replace
//! these with `anyhow::Error` — the typed variants are intentional.

use thiserror::Error;

use crate::readiness::{Stimulus, StimulusKind, TileReadiness};

// ── Load-time validation ──────────────────────────────────────────────────────

/// Why a rule table was rejected at load time.
///
/// Any of these aborts startup; a table that failed validation never reaches
/// [`StatusFusion`](super::StatusFusion).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesetError {
    /// The same (stimulus, readiness) key was inserted twice.
    #[error("duplicate rule for ({stimulus}, {state})")]
    DuplicateRule {
        stimulus: Stimulus,
        state: TileReadiness,
    },

    /// A stimulus value has no rule for the `Disabled` row.
    ///
    /// A disabled tile must ignore every external signal, so the `Disabled`
    /// row has to be total over the stimulus domain (administrative
    /// re-enabling excepted).
    #[error("disabled row is not total: no rule for ({stimulus}, disabled)")]
    DisabledRowMissing { stimulus: Stimulus },

    /// The `Disabled` row maps a stimulus to something other than
    /// `(Disabled, [])`.
    #[error("disabled row is not inert: ({stimulus}, disabled) changes state or emits actions")]
    DisabledRowReactive { stimulus: Stimulus },
}

// ── Runtime fusion errors ─────────────────────────────────────────────────────

/// Defect surfaced by [`StatusFusion::apply`](super::StatusFusion::apply).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FusionError {
    /// The rule table carries no rule at all for this stimulus kind — a
    /// programming or configuration defect, not a legitimate no-op.
    ///
    /// Unreachable through a validated table (the `Disabled`-row totality
    /// check forces every kind to be present), but the contract is kept for
    /// tables built with
    /// [`RulesetBuilder::build_unchecked`](super::ruleset::RulesetBuilder::build_unchecked).
    #[error("stimulus kind {kind:?} is not covered by the rule table")]
    UnrecognisedStimulus { kind: StimulusKind },
}
