// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{SyncError, TransportError};

/// All possible errors that can occur in the offq library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("invalid action kind: '{0}'\n  hint: valid kinds are: SUBMIT_REPORT, UPDATE_PROFILE")]
    InvalidKind(String),

    #[error("invalid status transition: cannot go from {from} to {to}\n  hint: from '{from}' you can go to: {valid_targets}")]
    InvalidTransition {
        from: String,
        to: String,
        valid_targets: String,
    },

    #[error("queue store is corrupt at line {line}: {reason}\n  hint: the file was left untouched; run 'offq clear --force' to discard it")]
    StoreCorrupt { line: usize, reason: String },

    #[error("invalid payload: {0}\n  hint: the payload must be valid JSON, e.g. '{{\"description\":\"overflow bin\"}}'")]
    InvalidPayload(String),

    #[error("offline: no connectivity, nothing was submitted")]
    Offline,

    #[error("syncing is stopped")]
    Paused,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("state directory {0} is in use by another offq process")]
    Locked(String),

    #[error("refusing to discard {count} queued action(s)\n  hint: pass --force to clear anyway")]
    ClearRefused { count: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Core(offq_core::Error),
}

/// A specialized Result type for offq operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<offq_core::Error> for Error {
    fn from(e: offq_core::Error) -> Self {
        match e {
            offq_core::Error::ActionNotFound(id) => Error::ActionNotFound(id),
            offq_core::Error::InvalidKind(kind) => Error::InvalidKind(kind),
            offq_core::Error::InvalidTransition { from, to, valid_targets } => {
                Error::InvalidTransition { from, to, valid_targets }
            }
            offq_core::Error::StoreCorrupt { line, reason } => Error::StoreCorrupt { line, reason },
            offq_core::Error::Io(e) => Error::Io(e),
            offq_core::Error::Json(e) => Error::Json(e),
            other => Error::Core(other),
        }
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Store(e) => e.into(),
            SyncError::Offline => Error::Offline,
            SyncError::Paused => Error::Paused,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
