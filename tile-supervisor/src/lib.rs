/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Tile supervisor — per-tile readiness fusion and poll scheduling.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── readiness   – TileReadiness ladder, Stimulus, Action, Transition
//! ├── fusion/     – StatusFusion orchestrator, rule table, fusion errors
//! ├── poll/       – RequestScheduler, command queue, attribute cycle
//! ├── health/     – threshold evaluation of monitoring snapshots
//! ├── config/     – YAML supervisor configuration
//! └── supervisor  – per-tile façade: fusion + scheduler + stimulus inbox
//! ```
//!
//! The crate performs no hardware I/O and never blocks: the hosting runtime
//! owns the transport, executes the [`Action`](readiness::Action)s and
//! [`PollRequest`](poll::PollRequest)s this crate hands out, and feeds the
//! outcomes back in as [`Stimulus`](readiness::Stimulus) values.

pub mod config;
pub mod fusion;
pub mod health;
pub mod poll;
pub mod readiness;
pub mod supervisor;
