// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity observation.
//!
//! A [`NetworkMonitor`] is the single writer of the online flag; it hands out
//! any number of [`NetworkObserver`]s that read it. Observers can register
//! callbacks that fire on every transition (never on repeated reports of the
//! same state). When connectivity cannot be determined the flag is offline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Edge reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// offline → online
    Online,
    /// online → offline
    Offline,
}

type Callback = Arc<dyn Fn(Transition) + Send + Sync>;

struct Shared {
    state: watch::Sender<bool>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
    /// Held while a transition is published so subscribers see transitions
    /// in the order they happened.
    publishing: Mutex<()>,
}

impl Shared {
    fn subscribers(&self) -> MutexGuard<'_, Vec<(u64, Callback)>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Owner and only writer of the connectivity flag.
pub struct NetworkMonitor {
    shared: Arc<Shared>,
}

impl NetworkMonitor {
    /// Creates a monitor with the given initial state.
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        NetworkMonitor {
            shared: Arc::new(Shared {
                state,
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                publishing: Mutex::new(()),
            }),
        }
    }

    /// Returns a read handle.
    pub fn observer(&self) -> NetworkObserver {
        NetworkObserver { shared: Arc::clone(&self.shared) }
    }

    /// Reports the platform's view of connectivity. Subscribers are invoked
    /// only if the state changed.
    pub fn set_online(&self, online: bool) {
        let _publishing = self.shared.publishing.lock().unwrap_or_else(|e| e.into_inner());

        let changed = self.shared.state.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if !changed {
            return;
        }

        let transition = if online { Transition::Online } else { Transition::Offline };
        tracing::info!("network is now {}", if online { "online" } else { "offline" });

        // Callbacks run outside the subscriber lock so they may unsubscribe.
        let callbacks: Vec<Callback> =
            self.shared.subscribers().iter().map(|(_, cb)| Arc::clone(cb)).collect();
        for callback in callbacks {
            callback(transition);
        }
    }

    /// Connectivity could not be determined; treated as offline.
    pub fn set_unknown(&self) {
        self.set_online(false);
    }

    pub fn current(&self) -> bool {
        *self.shared.state.borrow()
    }
}

/// Read handle on the connectivity flag.
#[derive(Clone)]
pub struct NetworkObserver {
    shared: Arc<Shared>,
}

impl NetworkObserver {
    /// Best-effort current state.
    pub fn current(&self) -> bool {
        *self.shared.state.borrow()
    }

    /// Invokes `callback` on every transition until the returned handle is
    /// dropped or unsubscribed.
    pub fn subscribe(&self, callback: impl Fn(Transition) + Send + Sync + 'static) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared.subscribers().push((id, Arc::new(callback)));
        Subscription { id, shared: Arc::downgrade(&self.shared) }
    }

    /// Receiver for awaiting state changes in async code.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.shared.state.subscribe()
    }
}

/// Registration of a transition callback. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.subscribers().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Settings for the TCP reachability probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// `host:port` that must accept a TCP connection for the device to count
    /// as online.
    pub addr: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            addr: "localhost:7890".to_string(),
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(2),
        }
    }
}

/// Attempts one TCP connect. Errors and timeouts count as offline.
pub async fn probe_once(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!("probe {} failed: {}", addr, e);
            false
        }
        Err(_) => {
            tracing::debug!("probe {} timed out after {:?}", addr, timeout);
            false
        }
    }
}

/// Feeds `monitor` from a periodic TCP probe until `cancel` fires.
///
/// The monitor moves into the task, which becomes its only writer.
pub fn spawn_probe(
    monitor: NetworkMonitor,
    config: ProbeConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let online = tokio::select! {
                _ = cancel.cancelled() => break,
                online = probe_once(&config.addr, config.timeout) => online,
            };
            monitor.set_online(online);
        }

        tracing::debug!("network probe stopped");
    })
}
