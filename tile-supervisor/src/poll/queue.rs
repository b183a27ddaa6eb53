/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pending-command queue.
//!
//! [`RequestQueue`] is the single internally synchronised structure in this
//! crate: command-dispatch paths on other threads enqueue concurrently with
//! the one poll loop that dequeues.  Everything else (fusion state, the
//! attribute cursor) is single-writer and unlocked.
//!
//! Ordering is (priority, sequence): lower priority value dequeues first,
//! ties break in enqueue order.  A `BTreeMap` keyed by that pair gives both
//! deterministic ordering and O(log n) pop of the front entry — the same
//! determinism-first container choice used throughout this codebase.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

// ── CommandRequest ────────────────────────────────────────────────────────────

/// One queued command.
///
/// The `command` payload is opaque to this crate — the supervisor never
/// inspects or interprets it; the poll loop executes it against the hardware
/// channel and feeds the outcome back as a stimulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest<C> {
    /// Human-readable name, used only for logging and diagnostics.
    pub name: String,
    /// Opaque payload executed by the poll loop.
    pub command: C,
    /// Dequeue priority — lower value dequeues first.
    pub priority: u8,
    /// Monotonic enqueue counter; breaks priority ties in FIFO order.
    pub sequence: u64,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Enqueue failure.  Never silent: a bounded queue reports overflow to the
/// caller instead of dropping the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// The queue was constructed with a capacity and it is exhausted.
    #[error("command queue full: '{name}' rejected (capacity {capacity})")]
    Overflow { name: String, capacity: usize },
}

// ── RequestQueue ──────────────────────────────────────────────────────────────

struct QueueInner<C> {
    entries: BTreeMap<(u8, u64), CommandRequest<C>>,
    next_sequence: u64,
    capacity: Option<usize>,
}

/// Priority-ordered, FIFO-within-priority command queue.
///
/// Cheap to clone — clones share the same underlying queue, which is how
/// command-dispatch paths on other threads get an enqueue handle while the
/// poll loop keeps its own for dequeuing.
pub struct RequestQueue<C> {
    inner: Arc<Mutex<QueueInner<C>>>,
}

// Manual impl: a handle is cloneable regardless of whether `C` is.
impl<C> Clone for RequestQueue<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Default for RequestQueue<C> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<C> RequestQueue<C> {
    /// Create an unbounded queue.
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// Create a bounded queue; enqueueing beyond `capacity` returns
    /// [`EnqueueError::Overflow`].
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity))
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                entries: BTreeMap::new(),
                next_sequence: 0,
                capacity,
            })),
        }
    }

    /// Append a command.  Never blocks beyond the internal lock.
    ///
    /// Returns the sequence number assigned to the request.
    ///
    /// # Errors
    /// [`EnqueueError::Overflow`] on a full bounded queue; the command is
    /// not retained in that case.
    pub fn enqueue(
        &self,
        name: impl Into<String>,
        command: C,
        priority: u8,
    ) -> Result<u64, EnqueueError> {
        let name = name.into();
        let mut inner = self.lock();

        if let Some(capacity) = inner.capacity {
            if inner.entries.len() >= capacity {
                return Err(EnqueueError::Overflow { name, capacity });
            }
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        debug!(command = %name, priority, sequence, "command enqueued");
        inner.entries.insert(
            (priority, sequence),
            CommandRequest {
                name,
                command,
                priority,
                sequence,
            },
        );
        Ok(sequence)
    }

    /// Remove and return the front entry: lowest priority value, earliest
    /// sequence within it.  `None` when empty.
    pub fn pop(&self) -> Option<CommandRequest<C>> {
        self.lock().entries.pop_first().map(|(_, request)| request)
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// `true` when no commands are pending.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    // A poisoned mutex only means another enqueuer panicked mid-insert; the
    // map itself is still structurally sound, so recover the guard.
    fn lock(&self) -> std::sync::MutexGuard<'_, QueueInner<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
