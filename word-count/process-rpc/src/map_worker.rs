// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::proto::map_service_server::{MapService, MapServiceServer};
use crate::rpc::proto::{MapInput, MapOutput};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{error, info, warn};
use word_count_core::{map_chunk, STATUS_FAILURE, STATUS_SUCCESS};

const RESPONSE_BUFFER: usize = 64;

/// gRPC map worker
/// Maps every chunk named on the inbound stream, acknowledging each one as it
/// finishes, and closes with one aggregate status once the client half-closes.
#[derive(Clone)]
pub struct MapWorker {
    permits: Arc<Semaphore>,
}

impl MapWorker {
    /// `concurrency` bounds how many chunks are mapped at the same time
    pub fn new(concurrency: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub fn into_server(self) -> MapServiceServer<Self> {
        MapServiceServer::new(self)
    }
}

type Acks = mpsc::Sender<Result<MapOutput, Status>>;

async fn map_one(input: MapInput, permits: Arc<Semaphore>, acks: Acks) -> bool {
    let job_status = match permits.acquire_owned().await {
        Ok(_permit) => {
            let chunk_path = PathBuf::from(&input.input_file_path);
            match tokio::task::spawn_blocking(move || map_chunk(&chunk_path)).await {
                Ok(Ok(artifact)) => {
                    info!(
                        chunk = %input.input_file_path,
                        artifact = %artifact.display(),
                        "Chunk mapped"
                    );
                    STATUS_SUCCESS
                }
                Ok(Err(e)) => {
                    error!(chunk = %input.input_file_path, error = %e, "Map failed");
                    STATUS_FAILURE
                }
                Err(e) => {
                    error!(chunk = %input.input_file_path, error = %e, "Map task panicked");
                    STATUS_FAILURE
                }
            }
        }
        Err(e) => {
            error!(chunk = %input.input_file_path, error = %e, "Map worker is shutting down");
            STATUS_FAILURE
        }
    };

    let ack = MapOutput {
        input_file_path: input.input_file_path,
        job_status,
    };
    if acks.send(Ok(ack)).await.is_err() {
        warn!("Coordinator stopped listening for acknowledgments");
    }
    job_status == STATUS_SUCCESS
}

#[tonic::async_trait]
impl MapService for MapWorker {
    type MapStream = ReceiverStream<Result<MapOutput, Status>>;

    async fn map(
        &self,
        request: Request<Streaming<MapInput>>,
    ) -> Result<Response<Self::MapStream>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(RESPONSE_BUFFER);
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            let mut healthy = true;

            loop {
                match inbound.message().await {
                    Ok(Some(input)) => {
                        info!(
                            chunk = %input.input_file_path,
                            output = %input.output_file_path,
                            "Mapping chunk"
                        );
                        in_flight.spawn(map_one(input, permits.clone(), tx.clone()));
                    }
                    Ok(None) => break,
                    Err(status) => {
                        warn!(%status, "Map request stream failed");
                        healthy = false;
                        break;
                    }
                }
            }

            while let Some(joined) = in_flight.join_next().await {
                match joined {
                    Ok(mapped) => healthy &= mapped,
                    Err(e) => {
                        error!(error = %e, "Map task aborted");
                        healthy = false;
                    }
                }
            }

            let job_status = if healthy {
                STATUS_SUCCESS
            } else {
                STATUS_FAILURE
            };
            let batch = MapOutput {
                input_file_path: String::new(),
                job_status,
            };
            if tx.send(Ok(batch)).await.is_ok() {
                info!(job_status, "Map tasks completed");
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}
