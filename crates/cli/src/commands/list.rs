// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Duration, Utc};
use offq_core::PendingAction;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

use super::State;

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutputJson<'a> {
    count: usize,
    actions: &'a [PendingAction],
}

pub fn run(state: &State, output: OutputFormat) -> Result<()> {
    let queue = state.open_queue()?;
    let actions = queue.list();

    match output {
        OutputFormat::Text => {
            if actions.is_empty() {
                println!("Queue is empty.");
                return Ok(());
            }
            for line in format_lines(&actions, Utc::now()) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let out = ListOutputJson { count: actions.len(), actions: &actions };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// One line per action: id, kind, status, attempts, age, then the last error.
pub(crate) fn format_lines(actions: &[PendingAction], now: DateTime<Utc>) -> Vec<String> {
    actions
        .iter()
        .map(|action| {
            let mut line = format!(
                "{}  {:<14}  {:<7}  {:>2}  {:>4}",
                action.id,
                action.kind.as_str(),
                action.status.as_str(),
                action.attempts,
                format_age(action.age(now)),
            );
            if let Some(error) = &action.last_error {
                line.push_str("  ");
                line.push_str(error);
            }
            line
        })
        .collect()
}

/// Compact age such as `45s`, `12m`, `3h` or `2d`.
pub(crate) fn format_age(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
