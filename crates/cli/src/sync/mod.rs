// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline action queue and sync engine.
//!
//! Captures mutations while the device is offline, persists them, and
//! replays them against a remote service once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Producer   │────►│   ActionQueue   │────►│ ActionStore │
//! │ (enqueue)   │     │ (in-memory copy)│     │  (durable)  │
//! └─────────────┘     └────────┬────────┘     └─────────────┘
//!                              │ QueueEvent
//!                              ▼
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Network    │────►│ SyncCoordinator │────►│  Transport  │
//! │  Observer   │     │   (drains)      │     │   (trait)   │
//! └─────────────┘     └─────────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable queue: every mutation is persisted before it is acknowledged
//! - Edge-triggered connectivity observer with an optional TCP probe
//! - At most one drain at a time; triggers arriving mid-drain coalesce into
//!   a single follow-up
//! - A failing action never blocks the actions behind it
//! - Per-submission timeout and exponential backoff keyed on attempts
//! - Injectable transport trait for testing

mod coordinator;
mod network;
mod queue;
mod transport;

pub use coordinator::{
    Backoff, DrainReport, DrainTrigger, SyncConfig, SyncCoordinator, SyncError, SyncResult,
};
pub use network::{
    probe_once, spawn_probe, NetworkMonitor, NetworkObserver, ProbeConfig, Subscription,
    Transition,
};
pub use queue::{ActionQueue, QueueEvent};
pub use transport::{
    KindDispatcher, SubmitFuture, Transport, TransportError, TransportResult, WebSocketTransport,
};

#[cfg(test)]
pub(crate) mod test_helpers;
