// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `offq` bound to `temp` as its state directory.
pub fn offq(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("offq");
    cmd.arg("--state-dir").arg(temp.path()).env_remove("OFFQ_STATE_DIR").env_remove("RUST_LOG");
    cmd
}

/// Enqueues an action and returns its id.
pub fn enqueue(temp: &TempDir, kind: &str, payload: &str) -> String {
    let output = offq(temp).arg("enqueue").arg(kind).arg(payload).output().unwrap();
    assert!(output.status.success(), "enqueue failed: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn count(temp: &TempDir) -> usize {
    let output = offq(temp).arg("count").output().unwrap();
    String::from_utf8_lossy(&output.stdout).trim().parse().unwrap()
}

/// Writes `config.toml` into the state directory.
pub fn write_config(temp: &TempDir, content: &str) {
    std::fs::write(temp.path().join("config.toml"), content).unwrap();
}

/// An address nothing listens on.
pub fn closed_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}
