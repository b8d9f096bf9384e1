// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Path conventions for the filesystem handoff between the stages
//!
//! ```text
//! <input-dir>/temp/chunk001.txt       chunk written by the chunker
//! <input-dir>/temp/map-chunk001.txt   partial count table for that chunk
//! ```
//!
//! The reduce stage finds map artifacts purely by these names. Nothing cleans
//! `temp/` between jobs, so artifacts left by an earlier job over the same
//! directory are merged into the next reduce.

use std::path::{Path, PathBuf};

pub const CHUNK_DIR_NAME: &str = "temp";
pub const CHUNK_PREFIX: &str = "chunk";
pub const MAP_PREFIX: &str = "map-";
pub const EXTENSION: &str = ".txt";
const ORDINAL_WIDTH: usize = 3;

/// Directory that receives the chunks of `input_path`
pub fn chunk_dir(input_path: &Path) -> PathBuf {
    let parent = match input_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    parent.join(CHUNK_DIR_NAME)
}

pub fn chunk_file_name(ordinal: usize) -> String {
    format!(
        "{}{:0width$}{}",
        CHUNK_PREFIX,
        ordinal,
        EXTENSION,
        width = ORDINAL_WIDTH
    )
}

/// Recovers the ordinal from a chunk file name, `None` for anything else
pub fn chunk_ordinal(file_name: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(CHUNK_PREFIX)?
        .strip_suffix(EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Map artifact that belongs to the chunk at `chunk_path`, in the same directory
pub fn map_artifact_path(chunk_path: &Path) -> PathBuf {
    let stem = chunk_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{}{}{}", MAP_PREFIX, stem, EXTENSION);
    match chunk_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub fn is_map_artifact(file_name: &str) -> bool {
    file_name.len() > MAP_PREFIX.len() + EXTENSION.len()
        && file_name.starts_with(MAP_PREFIX)
        && file_name.ends_with(EXTENSION)
}
