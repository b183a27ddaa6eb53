/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data types for the tile supervisor.
//!
//! Three type families model the supervision pipeline:
//!
//! ```text
//! runtime event ──(Stimulus)──► StatusFusion ──(Transition)──► runtime
//!                                    │ readiness
//!                                    ▼
//!                            RequestScheduler ──(PollRequest)──► poll loop
//! ```
//!
//! * [`TileReadiness`] — the authoritative bring-up state of one tile.
//! * [`Stimulus`] — an inbound status signal, already decoded by the hosting
//!   runtime (no wire format is defined here).
//! * [`Action`] — an inert side-effect instruction produced by a readiness
//!   transition.  Actions are interpreted and executed only by the hosting
//!   runtime, never by this crate.
//!
//! # Ownership model
//! Exactly one `StatusFusion` owns the current [`TileReadiness`] per
//! supervised tile.  `Stimulus` and `Action` are small `Copy` values; a
//! [`Transition`] is handed to the caller by value and carries no references
//! back into the fusion state.

use std::fmt;

use serde::Deserialize;

// ── TileReadiness ─────────────────────────────────────────────────────────────

/// Bring-up state of one supervised tile.
///
/// The variants form a totally ordered ladder (declaration order is the
/// `Ord` order): a tile at `Connected` or above is reachable over its own
/// channel; everything below is inferred from the supplier proxy or the
/// local administrative control.
///
/// The value changes only through
/// [`StatusFusion::apply`](crate::fusion::StatusFusion::apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileReadiness {
    /// Nothing reliable is known about the tile.
    Unknown,
    /// Administratively disabled — all external signals are ignored.
    Disabled,
    /// The supplier proxy itself is unreachable, so the power state of the
    /// tile cannot be observed.
    Unconnected,
    /// The supplier reports that the chassis slot carries no supply.
    NoSupply,
    /// The supplier reports the tile is powered off.
    Off,
    /// Direct communication with the tile is established.
    Connected,
    /// Tile firmware is loaded and initialised.
    Initialised,
    /// Tile is initialised and time-synchronised.
    Synchronised,
}

impl TileReadiness {
    /// All readiness states in ladder order.
    pub const ALL: [TileReadiness; 8] = [
        TileReadiness::Unknown,
        TileReadiness::Disabled,
        TileReadiness::Unconnected,
        TileReadiness::NoSupply,
        TileReadiness::Off,
        TileReadiness::Connected,
        TileReadiness::Initialised,
        TileReadiness::Synchronised,
    ];

    /// Lower-case name as used in configuration files and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            TileReadiness::Unknown => "unknown",
            TileReadiness::Disabled => "disabled",
            TileReadiness::Unconnected => "unconnected",
            TileReadiness::NoSupply => "no_supply",
            TileReadiness::Off => "off",
            TileReadiness::Connected => "connected",
            TileReadiness::Initialised => "initialised",
            TileReadiness::Synchronised => "synchronised",
        }
    }
}

impl fmt::Display for TileReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Stimulus ──────────────────────────────────────────────────────────────────

/// Which link a [`Stimulus::LinkCommsChanged`] event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkPeer {
    /// The proxy of the power-supplying chassis.
    Supplier,
    /// The tile's own communication channel.
    Hardware,
}

/// Power state of the tile as reported by the supplier proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupplierPower {
    /// The supplier cannot determine the power state.
    Unknown,
    /// The chassis slot carries no supply.
    NoSupply,
    /// The tile is powered off.
    Off,
    /// The tile is powered on.
    On,
}

/// One inbound status signal.
///
/// Each variant carries the full payload of the event; the rule table is
/// keyed by the complete value, so no payload dimension is lost in the
/// lookup.  The three sources are independent and may contradict each other —
/// resolving that is exactly what the rule table encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stimulus {
    /// The local administrative enable/disable control was written.
    AdminModeChanged { online: bool },
    /// A link came up or went down: either the supplier proxy or the tile's
    /// own channel.
    LinkCommsChanged { peer: LinkPeer, established: bool },
    /// The supplier proxy reported a power state for the tile.
    SupplierReportedPower { state: SupplierPower },
}

/// Discriminant of a [`Stimulus`], used in lookup-failure diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StimulusKind {
    AdminMode,
    LinkComms,
    SupplierPower,
}

impl Stimulus {
    /// The discriminant of this stimulus.
    pub fn kind(self) -> StimulusKind {
        match self {
            Stimulus::AdminModeChanged { .. } => StimulusKind::AdminMode,
            Stimulus::LinkCommsChanged { .. } => StimulusKind::LinkComms,
            Stimulus::SupplierReportedPower { .. } => StimulusKind::SupplierPower,
        }
    }

    /// Every representable stimulus value (10 in total).
    ///
    /// Used by rule-table validation to check that the `Disabled` row is
    /// total.  Kept next to the enum so adding a variant fails the
    /// domain-size tests below rather than silently weakening validation.
    pub fn domain() -> Vec<Stimulus> {
        let mut all = Vec::with_capacity(10);
        for online in [false, true] {
            all.push(Stimulus::AdminModeChanged { online });
        }
        for peer in [LinkPeer::Supplier, LinkPeer::Hardware] {
            for established in [false, true] {
                all.push(Stimulus::LinkCommsChanged { peer, established });
            }
        }
        for state in [
            SupplierPower::Unknown,
            SupplierPower::NoSupply,
            SupplierPower::Off,
            SupplierPower::On,
        ] {
            all.push(Stimulus::SupplierReportedPower { state });
        }
        all
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stimulus::AdminModeChanged { online } => {
                write!(f, "admin_mode(online={online})")
            }
            Stimulus::LinkCommsChanged { peer, established } => {
                let peer = match peer {
                    LinkPeer::Supplier => "supplier",
                    LinkPeer::Hardware => "hardware",
                };
                write!(f, "link_comms({peer}, established={established})")
            }
            Stimulus::SupplierReportedPower { state } => {
                let state = match state {
                    SupplierPower::Unknown => "unknown",
                    SupplierPower::NoSupply => "no_supply",
                    SupplierPower::Off => "off",
                    SupplierPower::On => "on",
                };
                write!(f, "supplier_power({state})")
            }
        }
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// Side-effect instruction attached to a readiness transition.
///
/// Inert data: the hosting runtime executes these against the transport and
/// the quality-reporting layer.  `StatusFusion` only selects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Attempt to open the tile's own communication channel.
    EstablishTileConnection,
    /// Close the tile's communication channel if open.
    DropTileConnection,
    /// Report the new readiness to the downstream health consumer.
    PublishReadiness,
    /// Restart the monitoring-attribute cursor at the head of the allowed
    /// set for the new readiness.
    RestartAttributePoll,
}

// ── Transition ────────────────────────────────────────────────────────────────

/// Result of applying one [`Stimulus`]: the readiness after the stimulus and
/// the actions the runtime must now execute, in order.
///
/// An unmapped (stimulus, state) cell produces a `Transition` with the
/// unchanged readiness and an empty action list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub readiness: TileReadiness,
    pub actions: Vec<Action>,
}

impl Transition {
    /// `true` when the stimulus neither moved the readiness nor produced any
    /// action.
    pub fn is_noop(&self, previous: TileReadiness) -> bool {
        self.readiness == previous && self.actions.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── TileReadiness ─────────────────────────────────────────────────────────

    #[test]
    fn readiness_ladder_is_totally_ordered() {
        for pair in TileReadiness::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} must be below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn readiness_all_covers_every_state_once() {
        let mut seen = TileReadiness::ALL.to_vec();
        seen.dedup();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn readiness_display_matches_config_keys() {
        assert_eq!(TileReadiness::NoSupply.to_string(), "no_supply");
        assert_eq!(TileReadiness::Synchronised.to_string(), "synchronised");
    }

    #[test]
    fn readiness_deserialises_from_snake_case() {
        let r: TileReadiness = serde_yaml::from_str("no_supply").unwrap();
        assert_eq!(r, TileReadiness::NoSupply);
    }

    // ── Stimulus ──────────────────────────────────────────────────────────────

    #[test]
    fn stimulus_domain_has_ten_distinct_values() {
        let domain = Stimulus::domain();
        assert_eq!(domain.len(), 10);
        let mut sorted = domain.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 10, "domain values must be distinct");
    }

    #[test]
    fn stimulus_kind_partitions_the_domain() {
        let domain = Stimulus::domain();
        let admin = domain
            .iter()
            .filter(|s| s.kind() == StimulusKind::AdminMode)
            .count();
        let link = domain
            .iter()
            .filter(|s| s.kind() == StimulusKind::LinkComms)
            .count();
        let power = domain
            .iter()
            .filter(|s| s.kind() == StimulusKind::SupplierPower)
            .count();
        assert_eq!((admin, link, power), (2, 4, 4));
    }

    // ── Transition ────────────────────────────────────────────────────────────

    #[test]
    fn transition_noop_requires_same_state_and_no_actions() {
        let t = Transition {
            readiness: TileReadiness::Off,
            actions: vec![],
        };
        assert!(t.is_noop(TileReadiness::Off));
        assert!(!t.is_noop(TileReadiness::Unknown));

        let t = Transition {
            readiness: TileReadiness::Off,
            actions: vec![Action::PublishReadiness],
        };
        assert!(!t.is_noop(TileReadiness::Off));
    }
}
