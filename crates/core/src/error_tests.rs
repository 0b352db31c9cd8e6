// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_found = { Error::ActionNotFound("1-0-1".into()), "1-0-1" },
    invalid_kind = { Error::InvalidKind("DELETE_ALL".into()), "SUBMIT_REPORT" },
    invalid_status = { Error::InvalidStatus("done".into()), "pending, syncing, failed" },
    corrupt = { Error::StoreCorrupt { line: 3, reason: "eof".into() }, "line 3" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_invalid_transition_display() {
    let err = Error::InvalidTransition {
        from: "pending".into(),
        to: "failed".into(),
        valid_targets: "syncing".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("pending"));
    assert!(msg.contains("failed"));
    assert!(msg.contains("syncing"));
}

#[test]
fn only_not_found_is_benign() {
    assert!(Error::ActionNotFound("x".into()).is_not_found());
    assert!(!Error::InvalidId("x".into()).is_not_found());
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
