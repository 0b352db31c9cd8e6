// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use offq_core::{ActionStatus, MemoryStore};
use yare::parameterized;

#[test]
fn object_payload_accepted() {
    let value = parse_payload(r#"{"description":"overflow bin"}"#).unwrap();
    assert_eq!(value["description"], "overflow bin");
}

#[parameterized(
    array = { "[1,2]" },
    string = { "\"hello\"" },
    number = { "42" },
    null = { "null" },
)]
fn any_json_value_accepted(raw: &str) {
    let value = parse_payload(raw).unwrap();
    assert_eq!(value, serde_json::from_str::<Value>(raw).unwrap());
}

#[parameterized(
    unquoted_key = { "{description:" },
    empty = { "" },
    trailing_garbage = { "{} {}" },
)]
fn malformed_payload_rejected(raw: &str) {
    assert!(matches!(parse_payload(raw), Err(Error::InvalidPayload(_))));
}

#[test]
fn enqueue_persists_pending_action() {
    let store = MemoryStore::new();
    let queue = ActionQueue::open(store.clone(), 1).unwrap();

    let action = run_impl(
        &queue,
        ActionKind::SubmitReport,
        parse_payload(r#"{"description":"overflow bin"}"#).unwrap(),
        Some("  user-42 ".to_string()),
    )
    .unwrap();

    assert_eq!(action.status, ActionStatus::Pending);
    assert_eq!(action.identity.as_deref(), Some("user-42"));
    assert_eq!(store.snapshot(), vec![action]);
}

#[test]
fn blank_identity_dropped() {
    let queue = ActionQueue::open(MemoryStore::new(), 1).unwrap();
    let action = run_impl(
        &queue,
        ActionKind::UpdateProfile,
        parse_payload("{}").unwrap(),
        Some("   ".to_string()),
    )
    .unwrap();
    assert!(action.identity.is_none());
}

#[test]
fn scalar_payload_is_queued_as_is() {
    let queue = ActionQueue::open(MemoryStore::new(), 1).unwrap();
    let action =
        run_impl(&queue, ActionKind::UpdateProfile, parse_payload("\"Ana\"").unwrap(), None)
            .unwrap();
    assert_eq!(action.payload, Value::String("Ana".into()));
}
