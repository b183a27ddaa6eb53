/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The readiness rule table.
//!
//! A [`Ruleset`] is a finite, validated map from (full stimulus value,
//! current readiness) to an outcome: the readiness to adopt plus an ordered
//! action list.  The key is the *complete* stimulus value, so payload
//! dimensions (which link, which power state) are part of the lookup rather
//! than being re-dispatched inside the orchestrator.
//!
//! Tables are built once at startup through [`RulesetBuilder`] and validated
//! before the supervisor accepts traffic:
//!
//! 1. no duplicate keys;
//! 2. the `Disabled` row is total — every stimulus value except
//!    `AdminModeChanged { online: true }` maps `(Disabled) → (Disabled, [])`.
//!
//! `BTreeMap` (not `HashMap`) so iteration order is deterministic — required
//! for reproducible `--dump-rules` output and table-level tests.

use std::collections::BTreeMap;

use tracing::debug;

use crate::readiness::{Action, Stimulus, StimulusKind, TileReadiness};

use super::error::RulesetError;

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Right-hand side of one rule: the readiness to adopt and the actions the
/// runtime must execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub next: TileReadiness,
    pub actions: Vec<Action>,
}

/// Left-hand side of one rule.
pub type RuleKey = (Stimulus, TileReadiness);

// ── Ruleset ───────────────────────────────────────────────────────────────────

/// Validated readiness rule table.
///
/// Holding a `Ruleset` obtained from [`RulesetBuilder::build`] implies the
/// validation invariants hold.  Lookup misses are legitimate no-ops, not
/// errors.
#[derive(Debug, Clone)]
pub struct Ruleset {
    rules: BTreeMap<RuleKey, RuleOutcome>,
}

impl Ruleset {
    /// Look up the outcome for `stimulus` arriving while in `state`.
    pub fn lookup(&self, stimulus: Stimulus, state: TileReadiness) -> Option<&RuleOutcome> {
        self.rules.get(&(stimulus, state))
    }

    /// `true` if the table carries at least one rule for this stimulus kind.
    ///
    /// A kind with zero rules anywhere in the table is a programming defect
    /// (see [`FusionError::UnrecognisedStimulus`](super::error::FusionError)).
    pub fn recognises(&self, kind: StimulusKind) -> bool {
        self.rules.keys().any(|(s, _)| s.kind() == kind)
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over all rules in deterministic (stimulus, state) order.
    pub fn iter(&self) -> impl Iterator<Item = (&RuleKey, &RuleOutcome)> {
        self.rules.iter()
    }

    /// The authoritative built-in rule table.
    ///
    /// Encodes the fusion policy for the three signal sources:
    ///
    /// * the administrative control outranks everything — offline forces
    ///   `Disabled` from any state, and only online releases it;
    /// * losing the supplier proxy hides the power state entirely
    ///   (`Unconnected`);
    /// * supplier power reports move the tile between `NoSupply` / `Off` /
    ///   `Unknown`, and power-on triggers a direct connection attempt;
    /// * the tile's own channel is the strongest evidence: comms up means
    ///   `Connected` regardless of what the supplier last claimed, comms
    ///   down demotes to `Unknown` so the poll loop re-probes.
    ///
    /// Entry into `Initialised` / `Synchronised` belongs to the firmware
    /// tracking path outside this stimulus set; the table only carries the
    /// exit rows for those states.
    pub fn builtin() -> Result<Ruleset, RulesetError> {
        use crate::readiness::Action::{
            DropTileConnection as Drop, EstablishTileConnection as Connect,
            PublishReadiness as Publish, RestartAttributePoll as Restart,
        };
        use crate::readiness::LinkPeer::{Hardware, Supplier};
        use crate::readiness::SupplierPower as P;
        use crate::readiness::TileReadiness::{
            Connected, Disabled, Initialised, NoSupply, Off, Synchronised, Unconnected, Unknown,
        };

        let admin_offline = Stimulus::AdminModeChanged { online: false };
        let admin_online = Stimulus::AdminModeChanged { online: true };
        let supplier_lost = Stimulus::LinkCommsChanged {
            peer: Supplier,
            established: false,
        };
        let supplier_back = Stimulus::LinkCommsChanged {
            peer: Supplier,
            established: true,
        };
        let hw_down = Stimulus::LinkCommsChanged {
            peer: Hardware,
            established: false,
        };
        let hw_up = Stimulus::LinkCommsChanged {
            peer: Hardware,
            established: true,
        };
        let power = |state| Stimulus::SupplierReportedPower { state };

        let mut b = RulesetBuilder::new();

        // Administrative disable wins from every state.
        for state in TileReadiness::ALL {
            if state != Disabled {
                b = b.rule(admin_offline, state, Disabled, &[Drop, Publish]);
            }
        }
        // Re-enabling is the only way out of Disabled.
        b = b.rule(
            admin_online,
            Disabled,
            Unknown,
            &[Connect, Publish, Restart],
        );

        // Supplier proxy lost: the power state is no longer observable.
        for state in [Unknown, NoSupply, Off, Connected, Initialised, Synchronised] {
            b = b.rule(supplier_lost, state, Unconnected, &[Drop, Publish, Restart]);
        }
        // Supplier proxy back: power state still pending a report.
        b = b.rule(supplier_back, Unconnected, Unknown, &[Publish]);

        // Direct tile comms established: strongest evidence the tile is up.
        for state in [Unknown, Unconnected, NoSupply, Off] {
            b = b.rule(hw_up, state, Connected, &[Publish, Restart]);
        }
        // Direct tile comms lost: demote and let the poll loop re-probe.
        for state in [Connected, Initialised, Synchronised] {
            b = b.rule(hw_down, state, Unknown, &[Publish, Restart]);
        }

        // Supplier power reports.
        for state in [Unconnected, NoSupply, Off] {
            b = b.rule(power(P::Unknown), state, Unknown, &[Publish]);
        }
        for state in [Unknown, Unconnected, Off] {
            b = b.rule(power(P::NoSupply), state, NoSupply, &[Publish, Restart]);
        }
        for state in [Connected, Initialised, Synchronised] {
            b = b.rule(power(P::NoSupply), state, NoSupply, &[Drop, Publish, Restart]);
        }
        for state in [Unknown, Unconnected, NoSupply] {
            b = b.rule(power(P::Off), state, Off, &[Publish, Restart]);
        }
        for state in [Connected, Initialised, Synchronised] {
            b = b.rule(power(P::Off), state, Off, &[Drop, Publish, Restart]);
        }
        for state in [Unknown, Unconnected, NoSupply, Off] {
            b = b.rule(power(P::On), state, Unknown, &[Connect, Publish]);
        }

        // The required inert Disabled row for everything except re-enabling.
        for stimulus in Stimulus::domain() {
            if stimulus != admin_online {
                b = b.rule(stimulus, Disabled, Disabled, &[]);
            }
        }

        b.build()
    }
}

// ── RulesetBuilder ────────────────────────────────────────────────────────────

/// Accumulates rules, then validates the finished table.
#[derive(Debug, Default)]
pub struct RulesetBuilder {
    rules: BTreeMap<RuleKey, RuleOutcome>,
    duplicate: Option<RuleKey>,
}

impl RulesetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one rule.  The first duplicate key is remembered and reported by
    /// [`build`](Self::build).
    pub fn rule(
        mut self,
        on: Stimulus,
        from: TileReadiness,
        next: TileReadiness,
        actions: &[Action],
    ) -> Self {
        let key = (on, from);
        let outcome = RuleOutcome {
            next,
            actions: actions.to_vec(),
        };
        if self.rules.insert(key, outcome).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(key);
        }
        self
    }

    /// Validate and freeze the table.
    ///
    /// # Errors
    /// * [`RulesetError::DuplicateRule`] — a key was inserted twice.
    /// * [`RulesetError::DisabledRowMissing`] /
    ///   [`RulesetError::DisabledRowReactive`] — the `Disabled` row is not
    ///   total and inert over the stimulus domain (administrative
    ///   re-enabling excepted).
    pub fn build(self) -> Result<Ruleset, RulesetError> {
        if let Some((stimulus, state)) = self.duplicate {
            return Err(RulesetError::DuplicateRule { stimulus, state });
        }

        // Disabled-row totality: a disabled tile ignores the outside world.
        for stimulus in Stimulus::domain() {
            if stimulus == (Stimulus::AdminModeChanged { online: true }) {
                continue;
            }
            match self.rules.get(&(stimulus, TileReadiness::Disabled)) {
                None => return Err(RulesetError::DisabledRowMissing { stimulus }),
                Some(outcome) => {
                    if outcome.next != TileReadiness::Disabled || !outcome.actions.is_empty() {
                        return Err(RulesetError::DisabledRowReactive { stimulus });
                    }
                }
            }
        }

        debug!(rule_count = self.rules.len(), "rule table validated");
        Ok(Ruleset { rules: self.rules })
    }

    /// Freeze the table **without** validation.
    ///
    /// Lookup misses behave as usual (no-op); a stimulus kind with no rules
    /// at all surfaces as
    /// [`FusionError::UnrecognisedStimulus`](super::error::FusionError) at
    /// apply time.  Production tables must go through [`build`](Self::build).
    pub fn build_unchecked(self) -> Ruleset {
        Ruleset { rules: self.rules }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::{LinkPeer, SupplierPower};

    #[test]
    fn builtin_table_validates() {
        let rules = Ruleset::builtin().unwrap();
        assert!(!rules.is_empty());
    }

    #[test]
    fn builtin_covers_every_stimulus_kind() {
        let rules = Ruleset::builtin().unwrap();
        for kind in [
            StimulusKind::AdminMode,
            StimulusKind::LinkComms,
            StimulusKind::SupplierPower,
        ] {
            assert!(rules.recognises(kind), "{kind:?} must be covered");
        }
    }

    #[test]
    fn builtin_disabled_row_is_inert() {
        let rules = Ruleset::builtin().unwrap();
        for stimulus in Stimulus::domain() {
            if stimulus == (Stimulus::AdminModeChanged { online: true }) {
                continue;
            }
            let outcome = rules
                .lookup(stimulus, TileReadiness::Disabled)
                .unwrap_or_else(|| panic!("missing disabled rule for {stimulus}"));
            assert_eq!(outcome.next, TileReadiness::Disabled);
            assert!(outcome.actions.is_empty());
        }
    }

    #[test]
    fn builtin_admin_online_releases_disabled() {
        let rules = Ruleset::builtin().unwrap();
        let outcome = rules
            .lookup(
                Stimulus::AdminModeChanged { online: true },
                TileReadiness::Disabled,
            )
            .unwrap();
        assert_eq!(outcome.next, TileReadiness::Unknown);
        assert!(outcome.actions.contains(&Action::EstablishTileConnection));
    }

    #[test]
    fn builtin_hardware_comms_up_wins_over_stale_power_report() {
        // Supplier said off, but the tile answers directly: trust the tile.
        let rules = Ruleset::builtin().unwrap();
        let outcome = rules
            .lookup(
                Stimulus::LinkCommsChanged {
                    peer: LinkPeer::Hardware,
                    established: true,
                },
                TileReadiness::Off,
            )
            .unwrap();
        assert_eq!(outcome.next, TileReadiness::Connected);
    }

    #[test]
    fn builtin_power_off_drops_live_connection() {
        let rules = Ruleset::builtin().unwrap();
        for state in [
            TileReadiness::Connected,
            TileReadiness::Initialised,
            TileReadiness::Synchronised,
        ] {
            let outcome = rules
                .lookup(
                    Stimulus::SupplierReportedPower {
                        state: SupplierPower::Off,
                    },
                    state,
                )
                .unwrap();
            assert_eq!(outcome.next, TileReadiness::Off);
            assert!(outcome.actions.contains(&Action::DropTileConnection));
        }
    }

    #[test]
    fn lookup_miss_returns_none() {
        let rules = Ruleset::builtin().unwrap();
        // Power-on while already Connected carries no rule: legitimate no-op.
        assert!(rules
            .lookup(
                Stimulus::SupplierReportedPower {
                    state: SupplierPower::On
                },
                TileReadiness::Connected,
            )
            .is_none());
    }

    #[test]
    fn duplicate_rule_is_rejected() {
        let s = Stimulus::AdminModeChanged { online: false };
        let err = RulesetBuilder::new()
            .rule(s, TileReadiness::Unknown, TileReadiness::Disabled, &[])
            .rule(s, TileReadiness::Unknown, TileReadiness::Disabled, &[])
            .build()
            .unwrap_err();
        assert!(matches!(err, RulesetError::DuplicateRule { .. }));
    }

    #[test]
    fn incomplete_disabled_row_is_rejected() {
        let err = RulesetBuilder::new()
            .rule(
                Stimulus::AdminModeChanged { online: false },
                TileReadiness::Disabled,
                TileReadiness::Disabled,
                &[],
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RulesetError::DisabledRowMissing { .. }));
    }

    #[test]
    fn reactive_disabled_row_is_rejected() {
        // Start from a valid table, then overlay one reactive Disabled cell.
        let mut b = RulesetBuilder::new();
        for stimulus in Stimulus::domain() {
            if stimulus == (Stimulus::AdminModeChanged { online: true }) {
                continue;
            }
            let next = if stimulus == (Stimulus::SupplierReportedPower {
                state: SupplierPower::On,
            }) {
                TileReadiness::Unknown // escapes Disabled without admin consent
            } else {
                TileReadiness::Disabled
            };
            b = b.rule(stimulus, TileReadiness::Disabled, next, &[]);
        }
        let err = b.build().unwrap_err();
        assert!(matches!(err, RulesetError::DisabledRowReactive { .. }));
    }

    #[test]
    fn unchecked_build_skips_validation() {
        let rules = RulesetBuilder::new().build_unchecked();
        assert!(rules.is_empty());
        assert!(!rules.recognises(StimulusKind::AdminMode));
    }

    #[test]
    fn iteration_order_is_deterministic() {
        let a: Vec<_> = Ruleset::builtin().unwrap().iter().map(|(k, _)| *k).collect();
        let b: Vec<_> = Ruleset::builtin().unwrap().iter().map(|(k, _)| *k).collect();
        assert_eq!(a, b);
    }
}
