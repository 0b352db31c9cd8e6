// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `offq config` and config loading.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;

#[test]
fn config_prints_defaults() {
    let temp = TempDir::new().unwrap();
    offq(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("node_id = 1"))
        .stdout(predicate::str::contains("url = \"ws://localhost:7890\""))
        .stdout(predicate::str::contains("submit_timeout_ms = 10000"))
        .stdout(predicate::str::contains("probe_addr = \"localhost:7890\""));
}

#[test]
fn config_reflects_file() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "node_id = 4\n\n[sync]\nmax_attempts = 6\n");

    offq(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("node_id = 4"))
        .stdout(predicate::str::contains("max_attempts = 6"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "[remote]\nurl = \"https://example.com\"\n");

    offq(&temp)
        .arg("count")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"))
        .stderr(predicate::str::contains("ws://"));
}

#[test]
fn unknown_config_key_is_reported() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "[sync]\nretries = 3\n");

    offq(&temp).arg("config").assert().failure().stderr(predicate::str::contains("retries"));
}
