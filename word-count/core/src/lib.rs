// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod artifact;

mod error;
pub use error::{IoResultExt, MapReduceError, Result};

mod config;
pub use config::{JobConfig, DEFAULT_CHUNK_SIZE};

pub mod words;
pub use words::{extract_words, is_valid_token, normalize, tokenize};

mod chunker;
pub use chunker::{list_chunks, Chunk, ChunkSet, Chunker};

mod count_table;
pub use count_table::{CountTable, FinalCountTable, DELIMITER};

pub mod mapper;
pub use mapper::map_chunk;

pub mod reducer;
pub use reducer::reduce;

mod job;
pub use job::{ChunkStatus, Job, JobPhase, JobStatus, STATUS_FAILURE, STATUS_SUCCESS};

mod local;
pub use local::run_local;
