// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for delivering queued actions.
//!
//! The client submits one action at a time and the server answers with an
//! `ack` (delivered, remove it) or a `rejected` (keep it, retry later) carrying
//! the same id. Action ids double as idempotency keys on the server side.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{ActionKind, PendingAction};
use crate::id::ActionId;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Deliver an action.
    Submit {
        id: ActionId,
        kind: ActionKind,
        payload: Value,
        /// Caller identity attached at enqueue time, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity: Option<String>,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The action was applied.
    Ack { id: ActionId },

    /// The action was refused; the client keeps it for a later attempt.
    Rejected { id: ActionId, reason: String },

    /// Error not tied to a particular action.
    Error { message: String },
}

impl ClientMessage {
    /// Creates a Submit message for a queued action.
    pub fn submit(action: &PendingAction) -> Self {
        ClientMessage::Submit {
            id: action.id,
            kind: action.kind,
            payload: action.payload.clone(),
            identity: action.identity.clone(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    pub fn ack(id: ActionId) -> Self {
        ServerMessage::Ack { id }
    }

    pub fn rejected(id: ActionId, reason: impl Into<String>) -> Self {
        ServerMessage::Rejected { id, reason: reason.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error { message: message.into() }
    }

    /// The action id this message answers, if any.
    pub fn action_id(&self) -> Option<ActionId> {
        match self {
            ServerMessage::Ack { id } | ServerMessage::Rejected { id, .. } => Some(*id),
            ServerMessage::Error { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
