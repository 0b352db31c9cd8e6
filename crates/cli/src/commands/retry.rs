// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::sync::{probe_once, ActionQueue, DrainReport, NetworkMonitor, SyncCoordinator, Transport};

use super::sync::transport_for;
use super::State;

pub fn run(state: &State, output: OutputFormat) -> Result<()> {
    let queue = Arc::new(state.open_queue()?);
    let transport = Arc::new(transport_for(&state.config));
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let report = runtime.block_on(run_impl(queue, transport, &state.config))?;

    match output {
        OutputFormat::Text => println!("{}", summary(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Probes connectivity once, then drains ignoring backoff. Fails with
/// `Error::Offline` without submitting anything when the probe fails, even if
/// the queue is empty.
pub(crate) async fn run_impl(
    queue: Arc<ActionQueue>,
    transport: Arc<dyn Transport>,
    config: &Config,
) -> Result<DrainReport> {
    let probe = config.probe_config();
    let monitor = NetworkMonitor::new(probe_once(&probe.addr, probe.timeout).await);
    let coordinator =
        SyncCoordinator::new(queue, transport, monitor.observer(), config.sync_config());
    Ok(coordinator.retry_now().await?)
}

pub(crate) fn summary(report: &DrainReport) -> String {
    if report.attempted == 0 && report.skipped == 0 && !report.interrupted {
        return "Nothing to sync.".to_string();
    }
    let mut line = format!("Delivered {}, failed {}", report.succeeded, report.failed);
    if report.skipped > 0 {
        line.push_str(&format!(", skipped {}", report.skipped));
    }
    line.push('.');
    if report.interrupted {
        line.push_str(" Stopped early: connection lost.");
    }
    line
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
