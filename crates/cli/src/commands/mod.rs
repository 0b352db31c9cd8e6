// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod config;
pub mod count;
pub mod enqueue;
pub mod list;
pub mod retry;
pub mod sync;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use offq_core::JsonlStore;

use crate::config::{resolve_state_dir, Config};
use crate::error::{Error, Result};
use crate::sync::ActionQueue;

const LOCK_FILE_NAME: &str = "offq.lock";

/// An opened state directory, held exclusively by this process.
pub struct State {
    pub dir: PathBuf,
    pub config: Config,
    _lock: File,
}

impl State {
    /// Resolves, creates and locks the state directory, then loads its config.
    pub fn open(explicit: Option<&Path>) -> Result<Self> {
        let dir = resolve_state_dir(explicit)?;
        fs::create_dir_all(&dir)?;
        let lock = acquire_lock(&dir)?;
        let config = Config::load(&dir)?;
        Ok(State { dir, config, _lock: lock })
    }

    pub fn store(&self) -> Result<JsonlStore> {
        Ok(JsonlStore::open(&self.dir)?)
    }

    /// Loads the queue, recovering interrupted submissions.
    pub fn open_queue(&self) -> Result<ActionQueue> {
        Ok(ActionQueue::open(self.store()?, self.config.node_id)?)
    }
}

fn acquire_lock(dir: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dir.join(LOCK_FILE_NAME))?;
    file.try_lock_exclusive()
        .map_err(|_| Error::Locked(dir.display().to_string()))?;
    Ok(file)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
