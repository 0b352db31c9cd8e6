// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! One record per line. Writes replace the whole file atomically: records go
//! to a sibling temp file which is fsynced and then renamed over the target,
//! so readers only ever see the old collection or the new one.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Reads all records from a JSONL file.
///
/// Skips blank lines and returns an empty vec if the file doesn't exist. A
/// line that fails to parse yields [`Error::StoreCorrupt`] and nothing else is
/// returned; the file is not modified.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let reader = BufReader::new(file);
    let mut records = Vec::new();

    // Split on raw bytes so invalid UTF-8 is reported as corruption.
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let corrupt = |reason: String| Error::StoreCorrupt { line: index + 1, reason };
        let text = std::str::from_utf8(&line).map_err(|e| corrupt(e.to_string()))?;
        if text.trim().is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(text).map_err(|e| corrupt(e.to_string()))?;
        records.push(record);
    }

    Ok(records)
}

/// Writes all records to a JSONL file, atomically replacing existing content.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp_path = temp_path(path);

    let write_result = (|| -> Result<()> {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{json}")?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        fs::rename(&tmp_path, path)?;
        sync_parent(path);
        Ok(())
    })();

    if write_result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    write_result
}

/// Removes a JSONL file. A missing file is not an error.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Flushes the rename to disk where the platform allows opening directories.
fn sync_parent(path: &Path) {
    #[cfg(unix)]
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
