// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! offq-core: data model and durable storage for the offq offline queue.
//!
//! This crate provides the action types, id generation, the persisted store
//! and the wire protocol shared by the engine and its transports.

pub mod action;
pub mod error;
pub mod id;
pub mod jsonl;
pub mod protocol;
pub mod store;

pub use action::{ActionKind, ActionStatus, PendingAction};
pub use error::{Error, Result};
pub use id::{ActionId, ClockSource, IdClock, SystemClock};
pub use store::{ActionStore, JsonlStore, MemoryStore, STORAGE_KEY};
