// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chunker::Chunker;
use crate::config::JobConfig;
use crate::count_table::FinalCountTable;
use crate::error::Result;
use crate::mapper::map_chunk;
use crate::reducer::reduce;
use std::path::Path;
use tracing::info;

/// Runs chunk, map and reduce in-process, one chunk after the other
pub fn run_local(
    input_path: &Path,
    output_path: &Path,
    config: &JobConfig,
) -> Result<FinalCountTable> {
    config.validate()?;

    let chunk_set = Chunker::new(config.chunk_size).make_chunks(input_path)?;
    for chunk in &chunk_set.chunks {
        map_chunk(&chunk.path)?;
    }
    info!(chunks = chunk_set.chunks.len(), "Local map phase finished");

    reduce(&chunk_set.dir, output_path)
}
