// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for offq-core operations.

use thiserror::Error;

/// All possible errors that can occur in offq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("invalid action kind: '{0}'\n  hint: valid kinds are: SUBMIT_REPORT, UPDATE_PROFILE")]
    InvalidKind(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: pending, syncing, failed")]
    InvalidStatus(String),

    #[error("invalid status transition: cannot go from {from} to {to}\n  hint: from '{from}' you can go to: {valid_targets}")]
    InvalidTransition {
        from: String,
        to: String,
        valid_targets: String,
    },

    #[error("invalid action id: {0}")]
    InvalidId(String),

    #[error("offline queue is corrupt at line {line}: {reason}\n  hint: the store was left untouched; discard it explicitly to continue")]
    StoreCorrupt { line: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for the benign "already gone" case, which the sync
    /// coordinator treats as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ActionNotFound(_))
    }
}

/// A specialized Result type for offq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
