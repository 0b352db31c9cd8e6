// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued action types: PendingAction, ActionKind and ActionStatus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::id::ActionId;

/// The mutation an action carries. Opaque to the engine apart from transport
/// dispatch and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// A new field report (location, category, notes).
    SubmitReport,
    /// Changes to the user's profile.
    UpdateProfile,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::SubmitReport, ActionKind::UpdateProfile];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SubmitReport => "SUBMIT_REPORT",
            ActionKind::UpdateProfile => "UPDATE_PROFILE",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUBMIT_REPORT" => Ok(ActionKind::SubmitReport),
            "UPDATE_PROFILE" => Ok(ActionKind::UpdateProfile),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// Sync status of a queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Not yet attempted, or re-armed for another attempt.
    Pending,
    /// Currently in flight. Never submitted a second time while in this state.
    Syncing,
    /// The last attempt errored.
    Failed,
}

impl ActionStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Syncing => "syncing",
            ActionStatus::Failed => "failed",
        }
    }

    /// Check if a transition from this status to target is valid.
    ///
    /// pending → syncing → failed → pending. Success is not a status: a
    /// delivered action is removed from the queue.
    pub fn can_transition_to(&self, target: ActionStatus) -> bool {
        matches!(
            (self, target),
            (ActionStatus::Pending, ActionStatus::Syncing)
                | (ActionStatus::Syncing, ActionStatus::Failed)
                | (ActionStatus::Failed, ActionStatus::Pending)
        )
    }

    /// Get valid transition targets as a formatted string.
    pub fn valid_targets(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "syncing",
            ActionStatus::Syncing => "failed",
            ActionStatus::Failed => "pending",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ActionStatus::Pending),
            "syncing" => Ok(ActionStatus::Syncing),
            "failed" => Ok(ActionStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A captured mutation waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: ActionId,
    pub kind: ActionKind,
    /// Business data, forwarded to the transport untouched.
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
    pub status: ActionStatus,
    /// Number of submission attempts so far.
    #[serde(default)]
    pub attempts: u32,
    /// Reason reported by the last failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Opaque identity supplied by the caller's auth layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl PendingAction {
    /// Creates a fresh action: pending, never attempted.
    pub fn new(id: ActionId, kind: ActionKind, payload: Value, enqueued_at: DateTime<Utc>) -> Self {
        PendingAction {
            id,
            kind,
            payload,
            enqueued_at,
            status: ActionStatus::Pending,
            attempts: 0,
            last_error: None,
            last_attempt_at: None,
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Option<String>) -> Self {
        self.identity = identity;
        self
    }

    /// Moves the action to `target`, rejecting transitions outside the
    /// pending → syncing → failed → pending cycle.
    pub fn transition(&mut self, target: ActionStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
                valid_targets: self.status.valid_targets().to_string(),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Records a failed attempt: syncing → failed, attempts + 1.
    pub fn record_failure(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<()> {
        self.transition(ActionStatus::Failed)?;
        self.attempts = self.attempts.saturating_add(1);
        self.last_error = Some(reason.into());
        self.last_attempt_at = Some(at);
        Ok(())
    }

    /// Time elapsed since the action was captured, for display.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.enqueued_at)
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
