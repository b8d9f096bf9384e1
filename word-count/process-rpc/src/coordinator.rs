// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::rpc::proto::map_service_client::MapServiceClient;
use crate::rpc::proto::reduce_service_client::ReduceServiceClient;
use crate::rpc::proto::{MapInput, ReduceInput};
use crate::RpcError;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Channel, Endpoint};
use tracing::{info, warn};
use word_count_core::{
    ChunkStatus, Chunker, IoResultExt, Job, JobConfig, JobPhase, JobStatus, Result,
    STATUS_FAILURE,
};

/// Outcome of one job, returned once all connection resources are released
#[derive(Debug, Clone)]
pub struct JobReport {
    pub phase: JobPhase,
    pub chunk_dir: PathBuf,
    pub chunks: usize,
    pub completed: usize,
    pub failed: usize,
    /// Protocol failure that ended the job early, if any
    pub error: Option<String>,
}

impl JobReport {
    fn new(job: &Job, chunk_dir: PathBuf, error: Option<String>) -> Self {
        Self {
            phase: job.phase(),
            chunk_dir,
            chunks: job.status.len(),
            completed: job.status.count(ChunkStatus::Completed),
            failed: job.status.count(ChunkStatus::Failed),
            error,
        }
    }

    pub fn map_succeeded(&self) -> bool {
        matches!(
            self.phase,
            JobPhase::MapSucceeded
                | JobPhase::ReduceInFlight
                | JobPhase::ReduceSucceeded
                | JobPhase::ReduceFailed
        )
    }

    pub fn succeeded(&self) -> bool {
        self.phase == JobPhase::ReduceSucceeded
    }
}

/// Drives one job against a single map worker and a single reduce worker
pub struct Coordinator {
    map_endpoint: String,
    reduce_endpoint: String,
    config: JobConfig,
}

impl Coordinator {
    /// Endpoints are URIs such as `http://127.0.0.1:50051`
    pub fn new(map_endpoint: String, reduce_endpoint: String, config: JobConfig) -> Self {
        Self {
            map_endpoint,
            reduce_endpoint,
            config,
        }
    }

    pub fn from_address(ip: &str, map_port: u16, reduce_port: u16, config: JobConfig) -> Self {
        Self::new(
            format!("http://{}:{}", ip, map_port),
            format!("http://{}:{}", ip, reduce_port),
            config,
        )
    }

    /// Chunks `input_path`, maps every chunk, then reduces into `output_path`.
    /// Only local chunking failures are returned as errors; map and reduce
    /// failures end up in the report.
    pub async fn run(&self, input_path: &Path, output_path: &Path) -> Result<JobReport> {
        self.config.validate()?;
        // Workers may run in another directory
        let input_path = input_path.canonicalize().at(input_path)?;
        let output_path = std::path::absolute(output_path).at(output_path)?;

        let mut job = Job::new();
        let chunk_set = Chunker::new(self.config.chunk_size).make_chunks(&input_path)?;
        job.status.track(&chunk_set.chunks);
        job.advance(JobPhase::ChunksReady)?;

        job.advance(JobPhase::MapInFlight)?;
        let mut error = None;
        if let Err(e) = self.map_phase(&mut job.status, &output_path).await {
            warn!(error = %e, "Map phase aborted");
            error = Some(e.to_string());
        }
        if job.finish_map()? == JobPhase::MapFailed {
            warn!(
                chunks = job.status.len(),
                pending = job.status.count(ChunkStatus::Pending),
                failed = job.status.count(ChunkStatus::Failed),
                "Map phase failed, reduce skipped"
            );
            return Ok(JobReport::new(&job, chunk_set.dir, error));
        }
        info!(chunks = job.status.len(), "All map tasks completed");

        job.advance(JobPhase::ReduceInFlight)?;
        let code = match self.reduce_phase(&chunk_set.dir, &output_path).await {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "Reduce call failed");
                error = Some(e.to_string());
                STATUS_FAILURE
            }
        };
        let phase = job.finish_reduce(code)?;
        info!(%phase, code, "Job finished");

        Ok(JobReport::new(&job, chunk_set.dir, error))
    }

    async fn connect(&self, endpoint: &str) -> std::result::Result<Channel, RpcError> {
        let channel = Endpoint::from_shared(endpoint.to_string())?
            .connect_timeout(self.config.connect_timeout())
            .connect()
            .await?;
        Ok(channel)
    }

    /// Streams one request per pending chunk and applies the worker's
    /// acknowledgments to `status` until the stream closes or times out
    async fn map_phase(
        &self,
        status: &mut JobStatus,
        output_path: &Path,
    ) -> std::result::Result<(), RpcError> {
        let channel = self.connect(&self.map_endpoint).await?;
        let mut client = MapServiceClient::new(channel);

        let output_file_path = output_path.to_string_lossy().into_owned();
        let requests: Vec<MapInput> = status
            .pending()
            .map(|chunk_id| MapInput {
                input_file_path: chunk_id.to_string(),
                output_file_path: output_file_path.clone(),
            })
            .collect();

        let (tx, rx) = mpsc::channel(requests.len().max(1));
        let producer = tokio::spawn(async move {
            for request in requests {
                if tx.send(request).await.is_err() {
                    break;
                }
            }
        });

        let exchange = async {
            let mut inbound = client.map(ReceiverStream::new(rx)).await?.into_inner();
            while let Some(ack) = inbound.message().await? {
                if ack.input_file_path.is_empty() {
                    status.record_batch(ack.job_status);
                } else {
                    status.record_chunk(&ack.input_file_path, ack.job_status);
                }
            }
            Ok::<(), RpcError>(())
        };

        let map_timeout = self.config.map_timeout();
        let outcome = match timeout(map_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::Timeout(map_timeout)),
        };

        drop(client);
        self.release(producer).await;
        outcome
    }

    async fn reduce_phase(
        &self,
        map_dir: &Path,
        output_path: &Path,
    ) -> std::result::Result<i32, RpcError> {
        let channel = self.connect(&self.reduce_endpoint).await?;
        let mut client = ReduceServiceClient::new(channel);

        let request = ReduceInput {
            input_file_path: map_dir.to_string_lossy().into_owned(),
            output_file_path: output_path.to_string_lossy().into_owned(),
        };
        let response = client.reduce(request).await?;
        Ok(response.into_inner().job_status)
    }

    /// Stops the request producer and waits a bounded time for it to exit.
    /// The tonic channel is not awaited here; dropping the client releases it.
    async fn release(&self, producer: JoinHandle<()>) {
        producer.abort();
        if timeout(self.config.shutdown_timeout(), producer).await.is_err() {
            warn!("Map request producer did not stop in time");
        }
    }
}
