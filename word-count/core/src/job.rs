// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chunker::Chunk;
use crate::error::{MapReduceError, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Status code reported by a worker when its unit of work succeeded
pub const STATUS_SUCCESS: i32 = 2;
/// Status code reported by a worker when its unit of work failed
pub const STATUS_FAILURE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Pending,
    Completed,
    Failed,
}

/// Per-chunk completion view of one job, keyed by chunk identifier
#[derive(Debug, Clone, Default)]
pub struct JobStatus {
    entries: Vec<(String, ChunkStatus)>,
    index: HashMap<String, usize>,
}

impl JobStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `chunks` as Pending, in the given order
    pub fn track<'a>(&mut self, chunks: impl IntoIterator<Item = &'a Chunk>) {
        for chunk in chunks {
            let id = chunk.id();
            if self.index.contains_key(&id) {
                continue;
            }
            self.index.insert(id.clone(), self.entries.len());
            self.entries.push((id, ChunkStatus::Pending));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, chunk_id: &str) -> Option<ChunkStatus> {
        self.index.get(chunk_id).map(|&i| self.entries[i].1)
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, status)| *status == ChunkStatus::Pending)
            .map(|(id, _)| id.as_str())
    }

    pub fn count(&self, status: ChunkStatus) -> usize {
        self.entries.iter().filter(|(_, s)| *s == status).count()
    }

    /// True only for a non-empty job whose every chunk is Completed
    pub fn all_completed(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|(_, status)| *status == ChunkStatus::Completed)
    }

    /// Applies an acknowledgment for a single chunk
    pub fn record_chunk(&mut self, chunk_id: &str, code: i32) {
        let Some(&i) = self.index.get(chunk_id) else {
            warn!(chunk = chunk_id, code, "Acknowledgment for unknown chunk ignored");
            return;
        };
        let status = if code == STATUS_SUCCESS {
            ChunkStatus::Completed
        } else {
            ChunkStatus::Failed
        };
        debug!(chunk = chunk_id, ?status, "Chunk acknowledged");
        self.entries[i].1 = status;
    }

    /// Applies the aggregate signal: success completes every chunk still Pending,
    /// anything else leaves the job as it is
    pub fn record_batch(&mut self, code: i32) {
        if code != STATUS_SUCCESS {
            warn!(code, "Map worker reported batch failure");
            return;
        }
        for (_, status) in self.entries.iter_mut() {
            if *status == ChunkStatus::Pending {
                *status = ChunkStatus::Completed;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Created,
    ChunksReady,
    MapInFlight,
    MapSucceeded,
    MapFailed,
    ReduceInFlight,
    ReduceSucceeded,
    ReduceFailed,
}

impl JobPhase {
    pub fn can_advance_to(self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Created, ChunksReady)
                | (ChunksReady, MapInFlight)
                | (MapInFlight, MapSucceeded)
                | (MapInFlight, MapFailed)
                | (MapSucceeded, ReduceInFlight)
                | (ReduceInFlight, ReduceSucceeded)
                | (ReduceInFlight, ReduceFailed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobPhase::MapFailed | JobPhase::ReduceSucceeded | JobPhase::ReduceFailed
        )
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One run of the word-count pipeline as seen by the coordinator
#[derive(Debug, Clone)]
pub struct Job {
    phase: JobPhase,
    pub status: JobStatus,
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

impl Job {
    pub fn new() -> Self {
        Self {
            phase: JobPhase::Created,
            status: JobStatus::new(),
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn advance(&mut self, next: JobPhase) -> Result<()> {
        if !self.phase.can_advance_to(next) {
            return Err(MapReduceError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.phase, to = %next, "Job phase transition");
        self.phase = next;
        Ok(())
    }

    /// Closes the map phase from the recorded chunk statuses
    pub fn finish_map(&mut self) -> Result<JobPhase> {
        let next = if self.status.all_completed() {
            JobPhase::MapSucceeded
        } else {
            JobPhase::MapFailed
        };
        self.advance(next)?;
        Ok(next)
    }

    /// Closes the reduce phase from the worker's status code
    pub fn finish_reduce(&mut self, code: i32) -> Result<JobPhase> {
        let next = if code == STATUS_SUCCESS {
            JobPhase::ReduceSucceeded
        } else {
            JobPhase::ReduceFailed
        };
        self.advance(next)?;
        Ok(next)
    }
}
