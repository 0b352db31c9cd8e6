// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! offq - capture actions offline, deliver them when the network returns.
//!
//! This crate provides the sync engine and the `offq` command line tool.
//!
//! # Main Components
//!
//! - [`sync::ActionQueue`] - durable FIFO of pending actions
//! - [`sync::NetworkMonitor`] - edge-triggered connectivity observer
//! - [`sync::SyncCoordinator`] - drains the queue through a [`sync::Transport`]
//! - [`Config`] - engine configuration (`<state>/config.toml`)
//! - [`Error`] - error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use offq::sync::{ActionQueue, NetworkMonitor, SyncConfig, SyncCoordinator, WebSocketTransport};
//! use offq_core::{ActionKind, JsonlStore};
//!
//! let queue = Arc::new(ActionQueue::open(JsonlStore::open(dir)?, 1)?);
//! let monitor = NetworkMonitor::new(false);
//! let coordinator = Arc::new(SyncCoordinator::new(
//!     Arc::clone(&queue),
//!     Arc::new(WebSocketTransport::new("ws://localhost:7890")),
//!     monitor.observer(),
//!     SyncConfig::default(),
//! ));
//! let handle = coordinator.spawn(cancel.clone());
//!
//! queue.enqueue(ActionKind::SubmitReport, payload)?;
//! monitor.set_online(true); // drains
//! ```

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use std::path::Path;

use commands::State;
use tracing_subscriber::EnvFilter;

/// Log file written by `offq sync` inside the state directory.
pub const SYNC_LOG_FILE_NAME: &str = "sync.log";

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let state = State::open(cli.state_dir.as_deref())?;

    match cli.command {
        Command::Enqueue { kind, payload, identity, output } => {
            init_stderr_logging();
            commands::enqueue::run(&state, kind, &payload, identity, output)
        }
        Command::List { output } => {
            init_stderr_logging();
            commands::list::run(&state, output)
        }
        Command::Count => {
            init_stderr_logging();
            commands::count::run(&state)
        }
        Command::Clear { force } => {
            init_stderr_logging();
            commands::clear::run(&state, force)
        }
        Command::Retry { output } => {
            init_stderr_logging();
            commands::retry::run(&state, output)
        }
        Command::Sync => {
            init_file_logging(&state.dir.join(SYNC_LOG_FILE_NAME));
            commands::sync::run(&state)
        }
        Command::Config => commands::config::run(&state),
    }
}

/// One-shot commands only surface warnings.
fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_file_logging(log_path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    let result = match std::fs::OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    // Already initialized by an embedding application
    let _ = result;
}
