// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `offq enqueue`, `list`, `count` and `clear`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::common::*;
use yare::parameterized;

#[test]
fn fresh_state_dir_is_empty() {
    let temp = TempDir::new().unwrap();
    offq(&temp).arg("count").assert().success().stdout("0\n");
    offq(&temp).arg("list").assert().success().stdout(predicate::str::contains("Queue is empty."));
}

#[test]
fn enqueue_prints_id_and_persists() {
    let temp = TempDir::new().unwrap();
    let id = enqueue(&temp, "SUBMIT_REPORT", r#"{"description":"overflow bin"}"#);

    assert!(!id.is_empty());
    assert_eq!(count(&temp), 1);
    assert!(temp.path().join("offline_queue.jsonl").exists());

    offq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(&id))
        .stdout(predicate::str::contains("SUBMIT_REPORT"))
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn list_keeps_enqueue_order() {
    let temp = TempDir::new().unwrap();
    let first = enqueue(&temp, "submit_report", r#"{"n":1}"#);
    let second = enqueue(&temp, "update-profile", r#"{"n":2}"#);
    let third = enqueue(&temp, "SUBMIT_REPORT", r#"{"n":3}"#);

    let output = offq(&temp).arg("list").arg("-o").arg("json").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["count"], 3);
    let payloads: Vec<i64> = json["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["payload"]["n"].as_i64().unwrap())
        .collect();
    assert_eq!(payloads, vec![1, 2, 3]);
    assert_eq!(json["actions"][1]["kind"], "UPDATE_PROFILE");
    assert_eq!(json["actions"][0]["status"], "pending");

    let text = offq(&temp).arg("list").output().unwrap();
    let text = String::from_utf8_lossy(&text.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with(&first));
    assert!(lines[1].starts_with(&second));
    assert!(lines[2].starts_with(&third));
}

#[test]
fn enqueue_json_output_includes_identity() {
    let temp = TempDir::new().unwrap();
    let output = offq(&temp)
        .args(["enqueue", "UPDATE_PROFILE", r#"{"name":"Ana"}"#, "--identity", "user-42"])
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["identity"], "user-42");
    assert_eq!(json["attempts"], 0);
    assert_eq!(json["payload"]["name"], "Ana");
}

#[test]
fn enqueue_accepts_non_object_payload() {
    let temp = TempDir::new().unwrap();
    let output =
        offq(&temp).args(["enqueue", "UPDATE_PROFILE", "[1,2,3]", "-o", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["payload"], serde_json::json!([1, 2, 3]));
    assert_eq!(count(&temp), 1);
}

#[parameterized(
    unquoted_key = { "{description:" },
    truncated = { "[1,2" },
    two_values = { "{} {}" },
)]
fn enqueue_rejects_bad_payload(payload: &str) {
    let temp = TempDir::new().unwrap();
    offq(&temp)
        .args(["enqueue", "SUBMIT_REPORT", payload])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid payload"));
    assert_eq!(count(&temp), 0);
}

#[test]
fn enqueue_rejects_unknown_kind() {
    let temp = TempDir::new().unwrap();
    offq(&temp)
        .args(["enqueue", "DELETE_EVERYTHING", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown kind"));
}

#[test]
fn clear_refuses_without_force() {
    let temp = TempDir::new().unwrap();
    enqueue(&temp, "SUBMIT_REPORT", "{}");
    enqueue(&temp, "SUBMIT_REPORT", "{}");

    offq(&temp)
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to discard 2 queued action(s)"));
    assert_eq!(count(&temp), 2);
}

#[test]
fn clear_force_discards_everything() {
    let temp = TempDir::new().unwrap();
    enqueue(&temp, "SUBMIT_REPORT", "{}");

    offq(&temp).args(["clear", "--force"]).assert().success();

    assert_eq!(count(&temp), 0);
    assert!(!temp.path().join("offline_queue.jsonl").exists());
}

#[test]
fn clear_on_empty_queue_succeeds() {
    let temp = TempDir::new().unwrap();
    offq(&temp).arg("clear").assert().success();
}

#[test]
fn corrupt_store_is_reported_and_kept() {
    let temp = TempDir::new().unwrap();
    enqueue(&temp, "SUBMIT_REPORT", "{}");
    let path = temp.path().join("offline_queue.jsonl");
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("{not json\n");
    std::fs::write(&path, &content).unwrap();

    offq(&temp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt at line 2"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);

    // Explicit discard recovers
    offq(&temp).args(["clear", "--force"]).assert().success();
    offq(&temp).arg("count").assert().success().stdout("0\n");
}

#[test]
fn state_dir_from_environment() {
    let temp = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("offq");
    cmd.env("OFFQ_STATE_DIR", temp.path()).args(["enqueue", "SUBMIT_REPORT", "{}"]);
    cmd.assert().success();

    assert_eq!(count(&temp), 1);
}
