// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::artifact;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::{IoResultExt, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A sealed, read-only slice of the input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub ordinal: usize,
    pub path: PathBuf,
}

impl Chunk {
    /// Stable identifier used to track the chunk across the job
    pub fn id(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Result of chunking one input file
#[derive(Debug, Clone)]
pub struct ChunkSet {
    pub dir: PathBuf,
    /// Ordered by ordinal
    pub chunks: Vec<Chunk>,
    pub skipped_lines: usize,
}

/// Splits an input file into chunks of at most `chunk_size` bytes.
/// Lines are never split; a line that cannot fit in an empty chunk is dropped.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Chunker {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn make_chunks(&self, input_path: &Path) -> Result<ChunkSet> {
        let dir = artifact::chunk_dir(input_path);
        fs::create_dir_all(&dir).at(&dir)?;

        let file = File::open(input_path).at(input_path)?;
        let mut reader = BufReader::new(file);

        let mut chunks = Vec::new();
        let mut buffer: Vec<u8> = Vec::with_capacity(self.chunk_size);
        let mut line = Vec::new();
        let mut line_no = 0usize;
        let mut skipped_lines = 0usize;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).at(input_path)? == 0 {
                break;
            }
            line_no += 1;
            strip_terminator(&mut line);

            let encoded_len = line.len() + 1;
            if encoded_len > self.chunk_size {
                warn!(
                    line = line_no,
                    bytes = encoded_len,
                    limit = self.chunk_size,
                    "Skipping line exceeding chunk size"
                );
                skipped_lines += 1;
                continue;
            }

            if buffer.len() + encoded_len > self.chunk_size {
                chunks.push(self.seal(&dir, chunks.len() + 1, &buffer)?);
                buffer.clear();
            }
            buffer.extend_from_slice(&line);
            buffer.push(b'\n');
        }

        if !buffer.is_empty() {
            chunks.push(self.seal(&dir, chunks.len() + 1, &buffer)?);
        }

        info!(
            input = %input_path.display(),
            chunks = chunks.len(),
            skipped_lines,
            "Chunking finished"
        );

        Ok(ChunkSet {
            dir,
            chunks,
            skipped_lines,
        })
    }

    fn seal(&self, dir: &Path, ordinal: usize, contents: &[u8]) -> Result<Chunk> {
        let path = dir.join(artifact::chunk_file_name(ordinal));
        fs::write(&path, contents).at(&path)?;
        debug!(chunk = %path.display(), bytes = contents.len(), "Sealed chunk");
        Ok(Chunk { ordinal, path })
    }
}

fn strip_terminator(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

/// Lists the chunks already present in `dir`, ordered by ordinal
pub fn list_chunks(dir: &Path) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    for entry in fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let name = entry.file_name();
        let Some(ordinal) = name.to_str().and_then(artifact::chunk_ordinal) else {
            continue;
        };
        if entry.file_type().at(&entry.path())?.is_file() {
            chunks.push(Chunk {
                ordinal,
                path: entry.path(),
            });
        }
    }
    chunks.sort_by_key(|chunk| chunk.ordinal);
    Ok(chunks)
}
