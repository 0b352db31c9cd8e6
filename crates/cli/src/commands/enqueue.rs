// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offq_core::{ActionKind, PendingAction};
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::sync::ActionQueue;

use super::State;

pub fn run(
    state: &State,
    kind: ActionKind,
    payload: &str,
    identity: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let payload = parse_payload(payload)?;
    let queue = state.open_queue()?;
    let action = run_impl(&queue, kind, payload, identity)?;

    match output {
        OutputFormat::Text => println!("{}", action.id),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&action)?),
    }
    Ok(())
}

pub(crate) fn run_impl(
    queue: &ActionQueue,
    kind: ActionKind,
    payload: Value,
    identity: Option<String>,
) -> Result<PendingAction> {
    let identity = identity.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Ok(queue.enqueue_as(kind, payload, identity)?)
}

/// Parses the payload argument. Any JSON value is accepted.
pub(crate) fn parse_payload(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| Error::InvalidPayload(e.to_string()))
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
