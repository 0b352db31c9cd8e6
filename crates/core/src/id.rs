// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Action identifiers.
//!
//! Ids are hybrid logical clock readings rendered as `{wall_ms}-{counter}-{node}`.
//! Comparing two ids compares wall time first, then the counter, then the node,
//! so ids generated by one clock sort in generation order.
//!
//! A fresh process seeds its clock ([`IdClock::observe`]) with the highest id
//! still persisted and with the store's high-water mark, which covers ids that
//! were already delivered or cleared. Every id issued afterwards sorts after
//! both, which keeps ids unique across restarts even when the wall clock moved
//! backwards.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Unique identifier of a queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for ids issued within the same millisecond.
    pub counter: u32,
    /// Writer identifier, the final tiebreaker.
    pub node: u32,
}

impl ActionId {
    pub fn new(wall_ms: u64, counter: u32, node: u32) -> Self {
        ActionId { wall_ms, counter, node }
    }

    /// Parses an id from its `wall_ms-counter-node` form.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl Ord for ActionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms
            .cmp(&other.wall_ms)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for ActionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wall_ms, self.counter, self.node)
    }
}

impl FromStr for ActionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('-');
        let (Some(wall), Some(counter), Some(node), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidId(format!(
                "expected format 'wall_ms-counter-node', got '{s}'"
            )));
        };

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidId(format!("invalid wall_ms '{wall}' in '{s}'")))?;
        let counter = counter
            .parse::<u32>()
            .map_err(|_| Error::InvalidId(format!("invalid counter '{counter}' in '{s}'")))?;
        let node = node
            .parse::<u32>()
            .map_err(|_| Error::InvalidId(format!("invalid node '{node}' in '{s}'")))?;

        Ok(ActionId::new(wall_ms, counter, node))
    }
}

/// Source of wall clock time, injectable for tests.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

/// Generator of strictly increasing [`ActionId`]s.
pub struct IdClock<C: ClockSource = SystemClock> {
    clock: C,
    node: u32,
    /// Last issued (wall_ms, counter).
    last: Mutex<(u64, u32)>,
}

impl IdClock<SystemClock> {
    pub fn new(node: u32) -> Self {
        Self::with_clock(SystemClock, node)
    }
}

impl<C: ClockSource> IdClock<C> {
    pub fn with_clock(clock: C, node: u32) -> Self {
        IdClock { clock, node, last: Mutex::new((0, 0)) }
    }

    pub fn node(&self) -> u32 {
        self.node
    }

    /// Issues the next id. Never returns an id less than or equal to a
    /// previously issued or observed one.
    pub fn next_id(&self) -> ActionId {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        if physical > last.0 {
            *last = (physical, 0);
        } else {
            // Wall clock stalled or went backwards
            last.1 = last.1.saturating_add(1);
        }

        ActionId::new(last.0, last.1, self.node)
    }

    /// Advances the clock past an id issued elsewhere (e.g. by a previous
    /// process that wrote the store).
    pub fn observe(&self, seen: &ActionId) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if (seen.wall_ms, seen.counter) > *last {
            *last = (seen.wall_ms, seen.counter);
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
