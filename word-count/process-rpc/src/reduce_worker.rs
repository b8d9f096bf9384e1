// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::proto::reduce_service_server::{ReduceService, ReduceServiceServer};
use crate::rpc::proto::{ReduceInput, ReduceOutput};
use std::path::PathBuf;
use tonic::{Request, Response, Status};
use tracing::{error, info};
use word_count_core::{reduce, STATUS_FAILURE, STATUS_SUCCESS};

/// gRPC reduce worker
/// Local failures are reported through `job_status`, never as an RPC error
#[derive(Clone, Default)]
pub struct ReduceWorker;

impl ReduceWorker {
    pub fn new() -> Self {
        Self
    }

    pub fn into_server(self) -> ReduceServiceServer<Self> {
        ReduceServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl ReduceService for ReduceWorker {
    async fn reduce(
        &self,
        request: Request<ReduceInput>,
    ) -> Result<Response<ReduceOutput>, Status> {
        let input = request.into_inner();
        info!(dir = %input.input_file_path, "Performing reduce");

        let map_dir = PathBuf::from(&input.input_file_path);
        let output_path = PathBuf::from(&input.output_file_path);
        let job_status = match tokio::task::spawn_blocking(move || reduce(&map_dir, &output_path))
            .await
        {
            Ok(Ok(table)) => {
                info!(
                    tokens = table.len(),
                    output = %input.output_file_path,
                    "Reduce task completed"
                );
                STATUS_SUCCESS
            }
            Ok(Err(e)) => {
                error!(dir = %input.input_file_path, error = %e, "Reduce failed");
                STATUS_FAILURE
            }
            Err(e) => {
                error!(dir = %input.input_file_path, error = %e, "Reduce task panicked");
                STATUS_FAILURE
            }
        };

        Ok(Response::new(ReduceOutput { job_status }))
    }
}
