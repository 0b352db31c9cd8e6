// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use offq_core::ActionKind;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse an action kind, accepting any case and `-` for `_`.
fn parse_kind(s: &str) -> Result<ActionKind, String> {
    s.parse::<ActionKind>().map_err(|_| {
        let valid: Vec<&str> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown kind '{}' (valid: {})", s, valid.join(", "))
    })
}

#[derive(Parser, Debug)]
#[command(name = "offq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Capture actions offline and deliver them once the network returns")]
#[command(
    long_about = "Capture actions offline and deliver them once the network returns.\n\n\
    Actions are persisted in a local queue and submitted in order to a WebSocket \
    endpoint whenever connectivity is available."
)]
pub struct Cli {
    /// Directory holding the queue, config and logs
    #[arg(long, global = true, value_name = "dir")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Queue an action for delivery
    #[command(after_help = "\
Examples:
  offq enqueue submit_report '{\"description\":\"overflow bin\"}'
  offq enqueue update-profile '{\"name\":\"Ana\"}' --identity user-42")]
    Enqueue {
        /// Action kind (SUBMIT_REPORT, UPDATE_PROFILE)
        #[arg(value_parser = parse_kind)]
        kind: ActionKind,

        /// Payload as a JSON object
        payload: String,

        /// Opaque caller identity forwarded with the action
        #[arg(long)]
        identity: Option<String>,

        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// List queued actions in delivery order
    List {
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Print the number of queued actions
    Count,

    /// Discard every queued action
    Clear {
        /// Discard even when actions are still queued, or the store is corrupt
        #[arg(long, short)]
        force: bool,
    },

    /// Submit queued actions now, ignoring backoff
    Retry {
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Keep the queue in sync until interrupted
    Sync,

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
