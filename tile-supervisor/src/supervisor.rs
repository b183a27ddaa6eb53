/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-tile supervision façade.
//!
//! [`TileSupervisor`] owns everything this crate keeps for one tile: the
//! [`StatusFusion`] state machine, the [`RequestScheduler`], and the single
//! inbound stimulus channel.  One instance is created per supervised tile
//! and lives for the process lifetime — there is no shared,
//! keyed-by-identifier table anywhere.
//!
//! All stimulus origins (administrative writes, supplier change
//! notifications, connection attempt results) post into the same inbox
//! through cloned [`StimulusSender`]s, so
//! [`StatusFusion::apply`] has exactly one call site:
//! [`process_pending`](TileSupervisor::process_pending), invoked by the one
//! poll loop driving this tile.  That keeps the readiness and cursor state
//! single-writer with no locking; the command queue is the only shared
//! structure (see [`RequestQueue`]).

use std::sync::mpsc;

use thiserror::Error;
use tracing::debug;

use crate::config::SupervisorConfig;
use crate::fusion::{Ruleset, StatusFusion};
use crate::poll::{PollRequest, RequestQueue, RequestScheduler, StaleAttributeSink};
use crate::readiness::{Stimulus, TileReadiness, Transition};

// ── Stimulus inbox ────────────────────────────────────────────────────────────

/// The supervisor side of the inbox went away — the tile is being torn down.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("tile supervisor inbox is closed")]
pub struct InboxClosed;

/// Cloneable producer handle for the supervisor's stimulus inbox.
///
/// Handed to every event source; posting never blocks.
#[derive(Debug, Clone)]
pub struct StimulusSender {
    tx: mpsc::Sender<Stimulus>,
}

impl StimulusSender {
    /// Post one stimulus for the poll loop to fold in on its next tick.
    ///
    /// # Errors
    /// [`InboxClosed`] if the owning supervisor was dropped.
    pub fn send(&self, stimulus: Stimulus) -> Result<(), InboxClosed> {
        self.tx.send(stimulus).map_err(|_| InboxClosed)
    }
}

// ── TileSupervisor ────────────────────────────────────────────────────────────

/// Fusion, scheduling, and the stimulus inbox for one tile.
///
/// `C` is the opaque command payload executed by the hosting poll loop.
pub struct TileSupervisor<C> {
    fusion: StatusFusion,
    scheduler: RequestScheduler<C>,
    inbox: mpsc::Receiver<Stimulus>,
    /// Kept so `stimuli()` handles survive even if every external clone is
    /// dropped and re-requested later.
    inbox_tx: mpsc::Sender<Stimulus>,
}

impl<C> TileSupervisor<C> {
    /// Assemble a supervisor from a validated rule table, a configuration,
    /// and the stale-attribute consumer.
    pub fn new(
        ruleset: Ruleset,
        config: SupervisorConfig,
        sink: Box<dyn StaleAttributeSink + Send>,
    ) -> Self {
        let queue = match config.queue_capacity {
            Some(capacity) => RequestQueue::bounded(capacity),
            None => RequestQueue::unbounded(),
        };
        let (inbox_tx, inbox) = mpsc::channel();
        Self {
            fusion: StatusFusion::new(ruleset),
            scheduler: RequestScheduler::new(config.attributes, queue, sink),
            inbox,
            inbox_tx,
        }
    }

    /// Current authoritative readiness.
    pub fn readiness(&self) -> TileReadiness {
        self.fusion.readiness()
    }

    /// A producer handle for posting stimuli into the inbox.
    pub fn stimuli(&self) -> StimulusSender {
        StimulusSender {
            tx: self.inbox_tx.clone(),
        }
    }

    /// A cloneable enqueue handle for command-dispatch paths on any thread.
    pub fn commands(&self) -> RequestQueue<C> {
        self.scheduler.commands()
    }

    /// Drain the inbox, folding every pending stimulus into the readiness
    /// state in arrival order.
    ///
    /// Returns the non-trivial transitions, in order; the hosting runtime
    /// executes their action lists.  Called once per poll tick, before
    /// [`next_request`](Self::next_request).
    ///
    /// # Errors
    /// Propagates [`FusionError`](crate::fusion::FusionError) from `apply`;
    /// stimuli already folded in stay folded in.
    pub fn process_pending(&mut self) -> Result<Vec<Transition>, crate::fusion::FusionError> {
        let mut transitions = Vec::new();
        while let Ok(stimulus) = self.inbox.try_recv() {
            let before = self.fusion.readiness();
            let transition = self.fusion.apply(stimulus)?;
            if !transition.is_noop(before) {
                transitions.push(transition);
            }
        }
        if !transitions.is_empty() {
            debug!(
                transitions = transitions.len(),
                readiness = %self.fusion.readiness(),
                "stimulus inbox drained"
            );
        }
        Ok(transitions)
    }

    /// The single next interaction to perform against the tile's channel.
    pub fn next_request(&mut self) -> PollRequest<C> {
        self.scheduler.get_next(self.fusion.readiness())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
