// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for queued actions.
//!
//! A store holds the complete ordered collection of pending actions and is
//! always rewritten as a whole. It has no locking of its own: the action
//! queue owns it exclusively and serializes every call.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::action::PendingAction;
use crate::error::{Error, Result};
use crate::id::ActionId;
use crate::jsonl;

/// Fixed key under which the queue is persisted.
pub const STORAGE_KEY: &str = "offline_queue";

/// Persistence backend for the action queue.
pub trait ActionStore: Send {
    /// Returns all actions in insertion order.
    ///
    /// Fails with [`Error::StoreCorrupt`] if the persisted data cannot be
    /// deserialized. The persisted data is left as it was.
    fn load(&self) -> Result<Vec<PendingAction>>;

    /// Atomically replaces the persisted collection with `actions`.
    fn persist(&mut self, actions: &[PendingAction]) -> Result<()>;

    /// Removes all persisted actions. The high-water mark is kept.
    fn clear(&mut self) -> Result<()>;

    /// Highest id that ever left the store, if one was recorded.
    fn load_high_water(&self) -> Result<Option<ActionId>>;

    /// Records `id` as the highest id that ever left the store.
    fn persist_high_water(&mut self, id: &ActionId) -> Result<()>;
}

/// JSONL file store, one action per line, at `<dir>/offline_queue.jsonl`.
///
/// The high-water mark lives next to it in `<dir>/offline_queue.hwm.jsonl`.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    high_water_path: PathBuf,
}

impl JsonlStore {
    /// Opens the store inside `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(JsonlStore {
            path: dir.join(format!("{STORAGE_KEY}.jsonl")),
            high_water_path: dir.join(format!("{STORAGE_KEY}.hwm.jsonl")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn high_water_path(&self) -> &Path {
        &self.high_water_path
    }
}

impl ActionStore for JsonlStore {
    fn load(&self) -> Result<Vec<PendingAction>> {
        jsonl::read_all(&self.path)
    }

    fn persist(&mut self, actions: &[PendingAction]) -> Result<()> {
        jsonl::write_all(&self.path, actions)
    }

    fn clear(&mut self) -> Result<()> {
        jsonl::remove(&self.path)
    }

    fn load_high_water(&self) -> Result<Option<ActionId>> {
        let marks: Vec<ActionId> = jsonl::read_all(&self.high_water_path)?;
        Ok(marks.into_iter().max())
    }

    fn persist_high_water(&mut self, id: &ActionId) -> Result<()> {
        jsonl::write_all(&self.high_water_path, std::slice::from_ref(id))
    }
}

/// In-memory store for ephemeral queues and tests.
///
/// Clones share the same contents, so a test can keep a handle to inspect
/// what was persisted or to "restart" by opening a new queue on a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    actions: Vec<PendingAction>,
    high_water: Option<ActionId>,
    fail_writes: bool,
    persist_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `actions`.
    pub fn with_actions(actions: Vec<PendingAction>) -> Self {
        let store = Self::default();
        store.lock().actions = actions;
        store
    }

    /// Makes subsequent `persist`/`clear` calls fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Snapshot of the persisted collection.
    pub fn snapshot(&self) -> Vec<PendingAction> {
        self.lock().actions.clone()
    }

    pub fn high_water(&self) -> Option<ActionId> {
        self.lock().high_water
    }

    /// Number of successful `persist` calls so far.
    pub fn persist_count(&self) -> usize {
        self.lock().persist_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(inner: &MemoryInner) -> Result<()> {
        if inner.fail_writes {
            return Err(Error::Io(std::io::Error::other("memory store: writes disabled")));
        }
        Ok(())
    }
}

impl ActionStore for MemoryStore {
    fn load(&self) -> Result<Vec<PendingAction>> {
        Ok(self.snapshot())
    }

    fn persist(&mut self, actions: &[PendingAction]) -> Result<()> {
        let mut inner = self.lock();
        Self::check_writable(&inner)?;
        inner.actions = actions.to_vec();
        inner.persist_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut inner = self.lock();
        Self::check_writable(&inner)?;
        inner.actions.clear();
        Ok(())
    }

    fn load_high_water(&self) -> Result<Option<ActionId>> {
        Ok(self.high_water())
    }

    fn persist_high_water(&mut self, id: &ActionId) -> Result<()> {
        let mut inner = self.lock();
        Self::check_writable(&inner)?;
        inner.high_water = Some(*id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
