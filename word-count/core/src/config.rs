// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{IoResultExt, MapReduceError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Tunables for one word-count job
/// Every field is optional in the JSON file and falls back to its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Byte budget of a single chunk, line terminators included
    pub chunk_size: usize,
    /// Upper bound on the wait for the map stream to finish
    pub map_timeout_secs: u64,
    /// Grace period for tearing down connection resources
    pub shutdown_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Chunks a map server processes at the same time
    pub map_concurrency: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            map_timeout_secs: 60,
            shutdown_timeout_secs: 5,
            connect_timeout_secs: 10,
            map_concurrency: 8,
        }
    }
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).at(path)?;
        let config: JobConfig =
            serde_json::from_str(&contents).map_err(|source| MapReduceError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(MapReduceError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.map_timeout_secs == 0 {
            return Err(MapReduceError::InvalidConfig(
                "map_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.map_concurrency == 0 {
            return Err(MapReduceError::InvalidConfig(
                "map_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn map_timeout(&self) -> Duration {
        Duration::from_secs(self.map_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
