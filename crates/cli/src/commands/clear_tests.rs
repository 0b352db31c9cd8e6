// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use offq_core::{ActionKind, MemoryStore};
use serde_json::json;

#[test]
fn refuses_to_drop_queued_actions() {
    let store = MemoryStore::new();
    let queue = ActionQueue::open(store.clone(), 1).unwrap();
    queue.enqueue(ActionKind::SubmitReport, json!({})).unwrap();

    let err = run_impl(&queue).unwrap_err();

    assert!(matches!(err, Error::ClearRefused { count: 1 }));
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn empty_queue_clears() {
    let queue = ActionQueue::open(MemoryStore::new(), 1).unwrap();
    run_impl(&queue).unwrap();
    assert!(queue.is_empty());
}
