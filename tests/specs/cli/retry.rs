// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `offq retry`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;

#[test]
fn retry_with_empty_queue_does_nothing() {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let temp = TempDir::new().unwrap();
    write_config(
        &temp,
        &format!("[network]\nprobe_addr = \"{}\"\n", probe.local_addr().unwrap()),
    );
    offq(&temp).arg("retry").assert().success().stdout("Nothing to sync.\n");
}

#[test]
fn retry_with_empty_queue_still_reports_offline() {
    let temp = TempDir::new().unwrap();
    write_config(
        &temp,
        &format!("[network]\nprobe_addr = \"{}\"\nprobe_timeout_ms = 500\n", closed_addr()),
    );
    offq(&temp)
        .arg("retry")
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline"));
}

#[test]
fn retry_offline_fails_and_keeps_actions() {
    let temp = TempDir::new().unwrap();
    write_config(
        &temp,
        &format!("[network]\nprobe_addr = \"{}\"\nprobe_timeout_ms = 500\n", closed_addr()),
    );
    enqueue(&temp, "SUBMIT_REPORT", r#"{"description":"overflow bin"}"#);

    offq(&temp)
        .arg("retry")
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline"));

    assert_eq!(count(&temp), 1);
    offq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn retry_records_delivery_failure() {
    // The probe target accepts connections but the WebSocket endpoint does not
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let temp = TempDir::new().unwrap();
    write_config(
        &temp,
        &format!(
            "[remote]\nurl = \"ws://{}\"\n\n[network]\nprobe_addr = \"{}\"\n",
            closed_addr(),
            probe.local_addr().unwrap()
        ),
    );
    enqueue(&temp, "SUBMIT_REPORT", "{}");

    offq(&temp)
        .arg("retry")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delivered 0, failed 1"));

    offq(&temp)
        .args(["list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"failed\""))
        .stdout(predicate::str::contains("connection failed"));
}
