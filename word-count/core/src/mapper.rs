// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::artifact;
use crate::count_table::CountTable;
use crate::error::{IoResultExt, Result};
use crate::words::extract_words;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Counts the words of one chunk without persisting anything
pub fn count_chunk(chunk_path: &Path) -> Result<CountTable> {
    let file = File::open(chunk_path).at(chunk_path)?;
    let mut reader = BufReader::new(file);
    let mut table = CountTable::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).at(chunk_path)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        for word in extract_words(Some(&text)) {
            table.add(&word);
        }
    }

    Ok(table)
}

/// Maps one chunk and writes its partial count table next to it.
/// Running it twice on the same chunk rewrites an identical artifact.
pub fn map_chunk(chunk_path: &Path) -> Result<PathBuf> {
    let table = count_chunk(chunk_path)?;
    let artifact_path = artifact::map_artifact_path(chunk_path);
    table.write_to(&artifact_path)?;

    debug!(
        chunk = %chunk_path.display(),
        artifact = %artifact_path.display(),
        tokens = table.len(),
        "Mapped chunk"
    );
    Ok(artifact_path)
}
