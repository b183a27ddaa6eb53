/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Status fusion for one supervised tile.
//!
//! [`StatusFusion`] folds asynchronous, possibly stale or contradictory
//! signals from three independent sources — the local administrative
//! control, the supplier proxy, and the tile's own channel — into one
//! authoritative [`TileReadiness`] value, consulting the validated
//! [`Ruleset`] for every step.
//!
//! # Design decisions
//!
//! | Topic | Decision |
//! |---|---|
//! | Rule keys | typed `(Stimulus, TileReadiness)` pair — the full payload is part of the key |
//! | Unmapped cell | explicit no-op `Transition`, `debug!` logged |
//! | Uncovered stimulus kind | typed [`FusionError::UnrecognisedStimulus`], never swallowed |
//! | Readiness storage | one `StatusFusion` owned per tile, no shared tables |
//!
//! `apply` is a deterministic pure function of (current readiness, stimulus,
//! rule table): no counters, no accumulation, no hidden state.  Applying the
//! same stimulus twice from the same readiness yields the same transition
//! both times.
//!
//! # Example
//! ```rust,ignore
//! let mut fusion = StatusFusion::new(Ruleset::builtin()?);
//! let transition = fusion.apply(Stimulus::AdminModeChanged { online: false })?;
//! assert_eq!(transition.readiness, TileReadiness::Disabled);
//! ```

pub mod error;
pub mod ruleset;

pub use error::{FusionError, RulesetError};
pub use ruleset::{RuleOutcome, Ruleset, RulesetBuilder};

use tracing::{debug, info};

use crate::readiness::{Stimulus, TileReadiness, Transition};

// ── StatusFusion ──────────────────────────────────────────────────────────────

/// The readiness state machine for one tile.
///
/// Owns the current [`TileReadiness`] and the rule table.  Single-writer:
/// the one poll loop driving this tile is the only caller of
/// [`apply`](Self::apply), so no internal locking is needed (see the
/// concurrency notes on [`RequestQueue`](crate::poll::RequestQueue) for the
/// one structure that is synchronised).
#[derive(Debug)]
pub struct StatusFusion {
    ruleset: Ruleset,
    readiness: TileReadiness,
}

impl StatusFusion {
    /// Create a fusion instance starting at `Unknown`.
    pub fn new(ruleset: Ruleset) -> Self {
        Self::with_readiness(ruleset, TileReadiness::Unknown)
    }

    /// Create a fusion instance starting at an arbitrary readiness.
    ///
    /// Used when the hosting runtime restores a tile whose state is already
    /// known (and by tests that need to start mid-ladder).
    pub fn with_readiness(ruleset: Ruleset, readiness: TileReadiness) -> Self {
        Self { ruleset, readiness }
    }

    /// Current authoritative readiness.
    pub fn readiness(&self) -> TileReadiness {
        self.readiness
    }

    /// Fold one stimulus into the readiness state.
    ///
    /// Looks up `(stimulus, current readiness)` in the rule table:
    ///
    /// * hit — adopt the rule's readiness and return its action list;
    /// * miss — a legitimate "nothing to do here": readiness unchanged,
    ///   empty action list.
    ///
    /// # Errors
    /// [`FusionError::UnrecognisedStimulus`] if the table carries no rule at
    /// all for the stimulus kind — a programming defect that must fail
    /// loudly rather than be swallowed as a no-op.
    pub fn apply(&mut self, stimulus: Stimulus) -> Result<Transition, FusionError> {
        if !self.ruleset.recognises(stimulus.kind()) {
            return Err(FusionError::UnrecognisedStimulus {
                kind: stimulus.kind(),
            });
        }

        match self.ruleset.lookup(stimulus, self.readiness) {
            Some(outcome) => {
                if outcome.next != self.readiness {
                    info!(
                        stimulus = %stimulus,
                        from = %self.readiness,
                        to = %outcome.next,
                        actions = outcome.actions.len(),
                        "readiness transition"
                    );
                } else {
                    debug!(
                        stimulus = %stimulus,
                        state = %self.readiness,
                        actions = outcome.actions.len(),
                        "readiness confirmed"
                    );
                }
                self.readiness = outcome.next;
                Ok(Transition {
                    readiness: outcome.next,
                    actions: outcome.actions.clone(),
                })
            }
            None => {
                debug!(
                    stimulus = %stimulus,
                    state = %self.readiness,
                    "no rule for stimulus in this state — ignored"
                );
                Ok(Transition {
                    readiness: self.readiness,
                    actions: Vec::new(),
                })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
