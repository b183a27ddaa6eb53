/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Poll scheduling for one tile: "what is the single next thing to do?"
//!
//! The tile's channel services one request at a time, so once per poll tick
//! the hosting runtime asks [`RequestScheduler::get_next`] for exactly one
//! [`PollRequest`]:
//!
//! 1. a pending command, if any — commands always preempt monitoring reads,
//!    so they are never starved by routine polling;
//! 2. otherwise the next monitoring attribute in the round-robin over the
//!    set allowed for the current readiness;
//! 3. otherwise the explicit [`PollRequest::Idle`] sentinel (empty allowed
//!    set), distinguishable from a genuine request.
//!
//! The scheduler also watches for readiness changes between ticks: when the
//! allowed attribute set shrinks, the dropped names are delivered exactly
//! once to the [`StaleAttributeSink`] so the adjacent quality-reporting
//! layer can mark those values as no longer valid, and the attribute lap
//! restarts at the head of the new set.
//!
//! `get_next` never fails and never blocks (beyond the queue's internal
//! lock); it is called only by the single poll loop driving this tile.

pub mod cycle;
pub mod queue;

pub use cycle::AttributeCycle;
pub use queue::{CommandRequest, EnqueueError, RequestQueue};

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::AttributeMap;
use crate::readiness::TileReadiness;

// ── PollRequest ───────────────────────────────────────────────────────────────

/// The single next interaction to perform against the tile's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollRequest<C> {
    /// Execute a queued command.
    Command(CommandRequest<C>),
    /// Read one monitoring attribute.
    Attribute(String),
    /// Nothing to do this tick: no commands pending and the allowed
    /// attribute set for the current readiness is empty.
    Idle,
}

// ── StaleAttributeSink ────────────────────────────────────────────────────────

/// Consumer of stale-attribute notices.
///
/// Invoked synchronously from within [`RequestScheduler::get_next`] when a
/// readiness transition removed names from the allowed set.  Implementations
/// must not block the caller.
pub trait StaleAttributeSink {
    fn attributes_dropped(&mut self, stale: &BTreeSet<String>);
}

/// Sink that discards all notices.  Useful when no quality-reporting layer
/// is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StaleAttributeSink for NullSink {
    fn attributes_dropped(&mut self, _stale: &BTreeSet<String>) {}
}

// ── RequestScheduler ──────────────────────────────────────────────────────────

/// Combines the command queue and the attribute cycle into the per-tick
/// decision.
///
/// Owns the [`AttributeCycle`] (single-writer, unlocked) and a handle to the
/// shared [`RequestQueue`].  `C` is the opaque command payload type.
pub struct RequestScheduler<C> {
    queue: RequestQueue<C>,
    cycle: AttributeCycle,
    attributes: AttributeMap,
    sink: Box<dyn StaleAttributeSink + Send>,
    /// Readiness observed on the previous `get_next` call; `None` before the
    /// first call.
    last_readiness: Option<TileReadiness>,
}

impl<C> RequestScheduler<C> {
    /// Create a scheduler over `queue`, polling per-readiness attribute sets
    /// from `attributes` and reporting stale names to `sink`.
    pub fn new(
        attributes: AttributeMap,
        queue: RequestQueue<C>,
        sink: Box<dyn StaleAttributeSink + Send>,
    ) -> Self {
        Self {
            queue,
            cycle: AttributeCycle::default(),
            attributes,
            sink,
            last_readiness: None,
        }
    }

    /// A cloneable enqueue handle for command-dispatch paths.
    pub fn commands(&self) -> RequestQueue<C> {
        self.queue.clone()
    }

    /// Enqueue a command on behalf of the caller.  Thin forwarder kept so
    /// single-threaded hosts never need to touch the queue handle.
    ///
    /// # Errors
    /// [`EnqueueError::Overflow`] on a full bounded queue.
    pub fn enqueue(
        &self,
        name: impl Into<String>,
        command: C,
        priority: u8,
    ) -> Result<u64, EnqueueError> {
        self.queue.enqueue(name, command, priority)
    }

    /// Restart the attribute lap at the head of the current allowed set.
    ///
    /// The explicit external reset (test setup, runtime-forced re-read); the
    /// implicit restart on readiness change happens inside
    /// [`get_next`](Self::get_next).
    pub fn reset_cycle(&mut self) {
        self.cycle.reset();
    }

    /// Decide the single next interaction for the tile at `readiness`.
    ///
    /// Never fails; an empty schedule yields [`PollRequest::Idle`].
    pub fn get_next(&mut self, readiness: TileReadiness) -> PollRequest<C> {
        self.observe_readiness(readiness);

        // Commands preempt monitoring — they are never starved by polling.
        if let Some(request) = self.queue.pop() {
            debug!(
                command = %request.name,
                priority = request.priority,
                sequence = request.sequence,
                "next: queued command"
            );
            return PollRequest::Command(request);
        }

        match self.cycle.advance() {
            Some(name) => PollRequest::Attribute(name.to_string()),
            None => PollRequest::Idle,
        }
    }

    /// Track readiness changes between ticks: notify the sink of attributes
    /// that became meaningless and restart the lap over the new allowed set.
    fn observe_readiness(&mut self, readiness: TileReadiness) {
        match self.last_readiness {
            Some(previous) if previous == readiness => return,
            Some(previous) => {
                let old: BTreeSet<String> =
                    self.attributes.allowed(previous).iter().cloned().collect();
                let new: BTreeSet<String> =
                    self.attributes.allowed(readiness).iter().cloned().collect();
                let stale: BTreeSet<String> = old.difference(&new).cloned().collect();

                if !stale.is_empty() {
                    info!(
                        from = %previous,
                        to = %readiness,
                        stale = ?stale,
                        "attributes dropped by readiness transition"
                    );
                    self.sink.attributes_dropped(&stale);
                }
                self.cycle.restart(self.attributes.allowed(readiness).to_vec());
            }
            None => {
                // First observation: start the initial lap, nothing is stale.
                self.cycle.restart(self.attributes.allowed(readiness).to_vec());
            }
        }
        self.last_readiness = Some(readiness);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sink that records every notice it receives.
    #[derive(Default, Clone)]
    struct RecordingSink {
        notices: Arc<Mutex<Vec<BTreeSet<String>>>>,
    }

    impl StaleAttributeSink for RecordingSink {
        fn attributes_dropped(&mut self, stale: &BTreeSet<String>) {
            self.notices.lock().unwrap().push(stale.clone());
        }
    }

    fn attribute_map() -> AttributeMap {
        AttributeMap::default()
            .with(TileReadiness::Connected, &["v1", "v2", "v3"])
            .with(TileReadiness::Initialised, &["v1", "v4"])
    }

    fn scheduler() -> (RequestScheduler<&'static str>, RecordingSink) {
        let sink = RecordingSink::default();
        let s = RequestScheduler::new(
            attribute_map(),
            RequestQueue::unbounded(),
            Box::new(sink.clone()),
        );
        (s, sink)
    }

    fn attr<C: std::fmt::Debug>(request: PollRequest<C>) -> String {
        match request {
            PollRequest::Attribute(name) => name,
            other => panic!("expected attribute, got {other:?}"),
        }
    }

    // ── Command priority ──────────────────────────────────────────────────────

    #[test]
    fn commands_preempt_attribute_reads() {
        let (mut s, _) = scheduler();
        s.enqueue("a", "A", 1).unwrap();
        s.enqueue("b", "B", 1).unwrap();

        // A before B (FIFO at equal priority), both before any attribute.
        match s.get_next(TileReadiness::Connected) {
            PollRequest::Command(c) => assert_eq!(c.name, "a"),
            other => panic!("expected command, got {other:?}"),
        }
        match s.get_next(TileReadiness::Connected) {
            PollRequest::Command(c) => assert_eq!(c.name, "b"),
            other => panic!("expected command, got {other:?}"),
        }
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v1");
    }

    #[test]
    fn command_between_reads_does_not_derail_the_lap() {
        let (mut s, _) = scheduler();
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v1");

        s.enqueue("cmd", "C", 0).unwrap();
        assert!(matches!(
            s.get_next(TileReadiness::Connected),
            PollRequest::Command(_)
        ));

        // The lap resumes where it left off.
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v2");
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v3");
    }

    // ── Round-robin fairness ──────────────────────────────────────────────────

    #[test]
    fn every_attribute_is_visited_once_before_any_repeat() {
        let (mut s, _) = scheduler();
        let lap: Vec<_> = (0..3)
            .map(|_| attr(s.get_next(TileReadiness::Connected)))
            .collect();
        assert_eq!(lap, ["v1", "v2", "v3"]);
        // Second lap repeats the same fixed order.
        let lap2: Vec<_> = (0..3)
            .map(|_| attr(s.get_next(TileReadiness::Connected)))
            .collect();
        assert_eq!(lap2, ["v1", "v2", "v3"]);
    }

    #[test]
    fn empty_allowed_set_yields_idle() {
        let (mut s, _) = scheduler();
        // No attributes configured for Unknown.
        assert_eq!(s.get_next(TileReadiness::Unknown), PollRequest::Idle);
        assert_eq!(s.get_next(TileReadiness::Unknown), PollRequest::Idle);
    }

    // ── Stale-attribute detection ─────────────────────────────────────────────

    #[test]
    fn shrinking_transition_notifies_stale_set_exactly_once() {
        let (mut s, sink) = scheduler();
        // Mid-lap in Connected.
        s.get_next(TileReadiness::Connected);
        s.get_next(TileReadiness::Connected);

        // Connected {v1,v2,v3} → Initialised {v1,v4}: v2 and v3 are stale.
        let first = attr(s.get_next(TileReadiness::Initialised));
        assert_eq!(first, "v1", "fresh lap starts at the head of the new set");
        assert_eq!(attr(s.get_next(TileReadiness::Initialised)), "v4");

        let notices = sink.notices.lock().unwrap();
        assert_eq!(notices.len(), 1, "exactly one notice");
        let expected: BTreeSet<String> =
            ["v2".to_string(), "v3".to_string()].into_iter().collect();
        assert_eq!(notices[0], expected);
    }

    #[test]
    fn only_dropped_names_are_reported() {
        let (mut s, sink) = scheduler();
        s.get_next(TileReadiness::Initialised);
        // Initialised {v1,v4} → Connected {v1,v2,v3}: only v4 is stale.
        s.get_next(TileReadiness::Connected);
        // Connected → Connected: nothing further.
        s.get_next(TileReadiness::Connected);

        let notices = sink.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        let expected: BTreeSet<String> = [String::from("v4")].into_iter().collect();
        assert_eq!(notices[0], expected);
    }

    #[test]
    fn growing_transition_fires_no_notice() {
        let (mut s, sink) = scheduler();
        // Off has no attributes; Connected only adds names.
        s.get_next(TileReadiness::Off);
        s.get_next(TileReadiness::Connected);
        assert!(sink.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn first_call_never_reports_stale_attributes() {
        let (mut s, sink) = scheduler();
        s.get_next(TileReadiness::Initialised);
        assert!(sink.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn transition_to_empty_set_reports_everything_stale_then_idles() {
        let (mut s, sink) = scheduler();
        s.get_next(TileReadiness::Connected);

        assert_eq!(s.get_next(TileReadiness::Off), PollRequest::Idle);
        let notices = sink.notices.lock().unwrap();
        let expected: BTreeSet<String> = ["v1", "v2", "v3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(*notices, vec![expected]);
    }

    // ── Explicit reset ────────────────────────────────────────────────────────

    #[test]
    fn reset_cycle_starts_the_lap_over() {
        let (mut s, _) = scheduler();
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v1");
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v2");
        s.reset_cycle();
        assert_eq!(attr(s.get_next(TileReadiness::Connected)), "v1");
    }
}
