// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::sync::Arc;

use offq_core::ActionKind;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::sync::{
    probe_once, spawn_probe, ActionQueue, KindDispatcher, NetworkMonitor, SyncCoordinator,
    Transport, WebSocketTransport,
};

use super::State;

/// Runs the coordinator and the network probe until Ctrl-C.
pub fn run(state: &State) -> Result<()> {
    let queue = Arc::new(state.open_queue()?);
    let transport = Arc::new(transport_for(&state.config));

    eprintln!(
        "Syncing {} action(s) to {} (Ctrl-C to stop, log: {})",
        queue.count(),
        state.config.remote.url,
        state.dir.join(crate::SYNC_LOG_FILE_NAME).display()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(queue, transport, &state.config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
        }
    }))
}

/// Every action kind goes to the configured WebSocket endpoint over one
/// shared connection.
pub(crate) fn transport_for(config: &Config) -> KindDispatcher {
    let socket = Arc::new(WebSocketTransport::new(config.remote.url.clone()));
    ActionKind::ALL
        .iter()
        .fold(KindDispatcher::new(), |dispatcher, kind| {
            dispatcher.route(*kind, Arc::clone(&socket))
        })
}

/// Keeps `queue` in sync until `shutdown` completes, then lets in-flight
/// submissions finish.
pub(crate) async fn serve(
    queue: Arc<ActionQueue>,
    transport: Arc<dyn Transport>,
    config: &Config,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let probe = config.probe_config();
    let monitor = NetworkMonitor::new(probe_once(&probe.addr, probe.timeout).await);
    let coordinator = Arc::new(SyncCoordinator::new(
        queue,
        transport,
        monitor.observer(),
        config.sync_config(),
    ));

    let cancel = CancellationToken::new();
    let probe_task = spawn_probe(monitor, probe, cancel.clone());
    let sync_task = coordinator.spawn(cancel.clone());
    tracing::info!("syncing to {}", config.remote.url);

    shutdown.await;
    tracing::info!("shutting down");
    cancel.cancel();

    for task in [probe_task, sync_task] {
        if let Err(e) = task.await {
            tracing::error!("task failed during shutdown: {}", e);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
