// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the chunking, mapping and reducing stages
#[derive(Debug, Error)]
pub enum MapReduceError {
    /// Filesystem failure, tagged with the path that was being accessed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration values that cannot drive a job
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("job cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Configuration file exists but is not valid JSON for `JobConfig`
    #[error("failed to parse config '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, MapReduceError>;

/// Attaches the offending path to a raw `io::Result`
pub trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| MapReduceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
