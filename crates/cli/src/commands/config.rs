// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;

use super::State;

/// Prints the effective configuration, defaults included.
pub fn run(state: &State) -> Result<()> {
    println!("# {}", state.dir.join("config.toml").display());
    print!("{}", state.config.to_toml()?);
    Ok(())
}
