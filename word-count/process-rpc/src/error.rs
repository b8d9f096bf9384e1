// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;
use thiserror::Error;

/// Protocol-level failures seen by the coordinator while talking to a worker
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("cannot reach worker: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("worker call failed: {0}")]
    Status(#[from] tonic::Status),

    #[error("map stream did not finish within {0:?}")]
    Timeout(Duration),
}
