// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;

use super::State;

pub fn run(state: &State) -> Result<()> {
    let queue = state.open_queue()?;
    println!("{}", queue.count());
    Ok(())
}
