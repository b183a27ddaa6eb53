/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Round-robin cursor over the currently allowed monitoring attributes.
//!
//! [`AttributeCycle`] is a lazy, restartable, infinite sequence: within one
//! uninterrupted lap it visits every allowed name exactly once, in order,
//! then wraps.  A readiness transition (or an explicit reset) restarts the
//! cursor at the head of the new allowed set — a lap in progress is
//! abandoned, not resumed.
//!
//! Single-writer: only the poll loop advances the cursor, so no locking.

// ── AttributeCycle ────────────────────────────────────────────────────────────

/// Stateful cursor into the allowed attribute list.
#[derive(Debug, Default)]
pub struct AttributeCycle {
    names: Vec<String>,
    cursor: usize,
}

impl AttributeCycle {
    /// A cycle over `names`, positioned before the first element.
    pub fn new(names: Vec<String>) -> Self {
        Self { names, cursor: 0 }
    }

    /// Replace the allowed set and restart at its head.
    pub fn restart(&mut self, names: Vec<String>) {
        self.names = names;
        self.cursor = 0;
    }

    /// Rewind to the head of the current set without changing it.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Advance one step and return the attribute name at the new position.
    ///
    /// Wraps after the last entry, so every name is visited once per lap.
    /// Returns `None` when the allowed set is empty.
    pub fn advance(&mut self) -> Option<&str> {
        if self.names.is_empty() {
            return None;
        }
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.names.len();
        Some(&self.names[index])
    }

    /// The allowed set this cycle walks over.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
