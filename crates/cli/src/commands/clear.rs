// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offq_core::ActionStore;

use crate::error::{Error, Result};
use crate::sync::ActionQueue;

use super::State;

pub fn run(state: &State, force: bool) -> Result<()> {
    if force {
        // Works on a corrupt store too, which cannot be loaded.
        let mut store = state.store()?;
        store.clear()?;
        tracing::info!("queue discarded");
        println!("Queue cleared.");
        return Ok(());
    }

    let queue = state.open_queue()?;
    run_impl(&queue)?;
    println!("Queue is empty.");
    Ok(())
}

/// Clears an empty queue; refuses when actions would be lost.
pub(crate) fn run_impl(queue: &ActionQueue) -> Result<()> {
    let count = queue.count();
    if count > 0 {
        return Err(Error::ClearRefused { count });
    }
    queue.clear()?;
    Ok(())
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
