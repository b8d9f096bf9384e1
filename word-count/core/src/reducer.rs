// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::artifact;
use crate::count_table::{CountTable, FinalCountTable};
use crate::error::{IoResultExt, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Map artifacts in `map_dir`, sorted by file name.
/// Returns `None` when the directory cannot be listed.
pub fn discover_artifacts(map_dir: &Path) -> Option<Vec<PathBuf>> {
    let entries = match fs::read_dir(map_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %map_dir.display(), error = %e, "Cannot list map directory");
            return None;
        }
    };

    let mut artifacts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(artifact::is_map_artifact)
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    artifacts.sort();
    Some(artifacts)
}

/// Sums the given partial tables
pub fn collect_counts(artifacts: &[PathBuf]) -> Result<CountTable> {
    let mut total = CountTable::new();
    for path in artifacts {
        total.merge(&CountTable::read_from(path)?);
    }
    Ok(total)
}

/// Merges the map artifacts of `map_dir` and writes the ordered result to `output_path`.
/// A directory that cannot be listed is a no-op yielding an empty table.
pub fn reduce(map_dir: &Path, output_path: &Path) -> Result<FinalCountTable> {
    let Some(artifacts) = discover_artifacts(map_dir) else {
        return Ok(FinalCountTable::default());
    };

    let final_table = collect_counts(&artifacts)?.into_final();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).at(parent)?;
        }
    }
    final_table.write_to(output_path)?;

    info!(
        artifacts = artifacts.len(),
        tokens = final_table.len(),
        output = %output_path.display(),
        "Reduce finished"
    );
    Ok(final_table)
}
