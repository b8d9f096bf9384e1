// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::{ReceiverStream, TcpListenerStream};
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};
use word_count_core::{run_local, JobConfig, JobPhase, STATUS_FAILURE, STATUS_SUCCESS};
use word_count_process_rpc::rpc::proto::map_service_client::MapServiceClient;
use word_count_process_rpc::rpc::proto::map_service_server::{MapService, MapServiceServer};
use word_count_process_rpc::rpc::proto::reduce_service_server::{
    ReduceService, ReduceServiceServer,
};
use word_count_process_rpc::rpc::proto::{MapInput, MapOutput, ReduceInput, ReduceOutput};
use word_count_process_rpc::{serve_map, serve_reduce, Coordinator, MapWorker, ReduceWorker};

// ============================================================
// Test servers
// ============================================================

struct TestServer {
    endpoint: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn test_server(addr: SocketAddr, shutdown: oneshot::Sender<()>) -> TestServer {
    TestServer {
        endpoint: format!("http://{}", addr),
        shutdown: Some(shutdown),
    }
}

async fn start_map_worker() -> TestServer {
    let (listener, addr) = bind().await;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve_map(listener, MapWorker::new(4), async move {
        let _ = rx.await;
    }));
    test_server(addr, tx)
}

async fn start_reduce_worker() -> TestServer {
    let (listener, addr) = bind().await;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve_reduce(listener, ReduceWorker::new(), async move {
        let _ = rx.await;
    }));
    test_server(addr, tx)
}

/// Drains the request stream, then answers with a single batch signal
struct BatchOnlyMap {
    batch_code: i32,
    hang: bool,
}

#[tonic::async_trait]
impl MapService for BatchOnlyMap {
    type MapStream = ReceiverStream<Result<MapOutput, Status>>;

    async fn map(
        &self,
        request: Request<Streaming<MapInput>>,
    ) -> Result<Response<Self::MapStream>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(4);
        let batch_code = self.batch_code;
        let hang = self.hang;

        tokio::spawn(async move {
            while let Ok(Some(_)) = inbound.message().await {}
            if hang {
                let _open = tx;
                std::future::pending::<()>().await;
            } else {
                let batch = MapOutput {
                    input_file_path: String::new(),
                    job_status: batch_code,
                };
                let _ = tx.send(Ok(batch)).await;
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Counts calls and answers without touching the filesystem
#[derive(Clone, Default)]
struct CountingReduce {
    calls: Arc<AtomicUsize>,
}

#[tonic::async_trait]
impl ReduceService for CountingReduce {
    async fn reduce(
        &self,
        _request: Request<ReduceInput>,
    ) -> Result<Response<ReduceOutput>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(ReduceOutput {
            job_status: STATUS_SUCCESS,
        }))
    }
}

async fn start_fake_map(fake: BatchOnlyMap) -> TestServer {
    let (listener, addr) = bind().await;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(
        Server::builder()
            .add_service(MapServiceServer::new(fake))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                let _ = rx.await;
            }),
    );
    test_server(addr, tx)
}

async fn start_counting_reduce(fake: CountingReduce) -> TestServer {
    let (listener, addr) = bind().await;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(
        Server::builder()
            .add_service(ReduceServiceServer::new(fake))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                let _ = rx.await;
            }),
    );
    test_server(addr, tx)
}

fn write_input(dir: &Path, contents: &str) -> PathBuf {
    let input = dir.join("input.txt");
    fs::write(&input, contents).unwrap();
    input
}

fn test_config() -> JobConfig {
    JobConfig {
        map_timeout_secs: 10,
        shutdown_timeout_secs: 1,
        connect_timeout_secs: 2,
        ..JobConfig::default()
    }
}

// ============================================================
// End-to-end against the real workers
// ============================================================

#[tokio::test]
async fn test_job_counts_words_case_insensitively() {
    let map = start_map_worker().await;
    let reduce = start_reduce_worker().await;
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "The cat sat. The Cat SAT!\n");
    let output = dir.path().join("out").join("result.txt");

    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), test_config());
    let report = coordinator.run(&input, &output).await.unwrap();

    assert_eq!(report.phase, JobPhase::ReduceSucceeded);
    assert!(report.succeeded());
    assert_eq!(report.chunks, 1);
    assert_eq!(report.completed, 1);
    assert!(report.error.is_none());
    assert!(report.chunk_dir.join("map-chunk001.txt").exists());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "cat:2\nsat:2\nthe:2\n"
    );
}

#[tokio::test]
async fn test_job_matches_local_run_across_many_chunks() {
    let map = start_map_worker().await;
    let reduce = start_reduce_worker().await;
    let text = "Alpha beta gamma\nbeta gamma\ngamma delta-epsilon\n\nalpha, ALPHA; beta\n"
        .repeat(5);
    let config = JobConfig {
        chunk_size: 24,
        ..test_config()
    };

    let local_dir = tempfile::tempdir().unwrap();
    let local_input = write_input(local_dir.path(), &text);
    let local_output = local_dir.path().join("local.txt");
    run_local(&local_input, &local_output, &config).unwrap();

    let rpc_dir = tempfile::tempdir().unwrap();
    let rpc_input = write_input(rpc_dir.path(), &text);
    let rpc_output = rpc_dir.path().join("rpc.txt");
    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), config);
    let report = coordinator.run(&rpc_input, &rpc_output).await.unwrap();

    assert!(report.succeeded());
    assert!(report.chunks > 1, "Input should span several chunks");
    assert_eq!(report.completed, report.chunks);
    assert_eq!(
        fs::read_to_string(&rpc_output).unwrap(),
        fs::read_to_string(&local_output).unwrap()
    );
}

#[tokio::test]
async fn test_oversize_line_contributes_nothing() {
    let map = start_map_worker().await;
    let reduce = start_reduce_worker().await;
    let dir = tempfile::tempdir().unwrap();
    let long_line = "giant ".repeat(10);
    let input = write_input(dir.path(), &format!("small word\n{}\nword\n", long_line));
    let output = dir.path().join("result.txt");
    let config = JobConfig {
        chunk_size: 16,
        ..test_config()
    };

    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), config);
    let report = coordinator.run(&input, &output).await.unwrap();

    assert!(report.succeeded());
    assert_eq!(fs::read_to_string(&output).unwrap(), "word:2\nsmall:1\n");
}

#[tokio::test]
async fn test_unwritable_output_fails_reduce() {
    let map = start_map_worker().await;
    let reduce = start_reduce_worker().await;
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "one two\n");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let output = blocker.join("result.txt");

    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), test_config());
    let report = coordinator.run(&input, &output).await.unwrap();

    assert!(report.map_succeeded());
    assert_eq!(report.phase, JobPhase::ReduceFailed);
    assert!(!report.succeeded());
}

// ============================================================
// Map phase failures
// ============================================================

#[tokio::test]
async fn test_failed_batch_skips_reduce() {
    let map = start_fake_map(BatchOnlyMap {
        batch_code: STATUS_FAILURE,
        hang: false,
    })
    .await;
    let counting = CountingReduce::default();
    let reduce = start_counting_reduce(counting.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "a b c\nd e f\n");

    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), test_config());
    let report = coordinator
        .run(&input, &dir.path().join("result.txt"))
        .await
        .unwrap();

    assert_eq!(report.phase, JobPhase::MapFailed);
    assert_eq!(report.completed, 0);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("result.txt").exists());
}

#[tokio::test]
async fn test_successful_batch_completes_unacknowledged_chunks() {
    let map = start_fake_map(BatchOnlyMap {
        batch_code: STATUS_SUCCESS,
        hang: false,
    })
    .await;
    let counting = CountingReduce::default();
    let reduce = start_counting_reduce(counting.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "a b c\nd e f\n");
    let config = JobConfig {
        chunk_size: 6,
        ..test_config()
    };

    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), config);
    let report = coordinator
        .run(&input, &dir.path().join("result.txt"))
        .await
        .unwrap();

    assert_eq!(report.chunks, 2);
    assert_eq!(report.completed, 2);
    assert_eq!(report.phase, JobPhase::ReduceSucceeded);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_map_timeout_forces_shutdown() {
    let map = start_fake_map(BatchOnlyMap {
        batch_code: STATUS_SUCCESS,
        hang: true,
    })
    .await;
    let counting = CountingReduce::default();
    let reduce = start_counting_reduce(counting.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "never acknowledged\n");
    let config = JobConfig {
        map_timeout_secs: 1,
        ..test_config()
    };

    let coordinator = Coordinator::new(map.endpoint.clone(), reduce.endpoint.clone(), config);
    let report = coordinator
        .run(&input, &dir.path().join("result.txt"))
        .await
        .unwrap();

    assert_eq!(report.phase, JobPhase::MapFailed);
    assert!(report.error.unwrap().contains("did not finish"));
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_map_worker_fails_map() {
    let (listener, addr) = bind().await;
    drop(listener);
    let counting = CountingReduce::default();
    let reduce = start_counting_reduce(counting.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "hello\n");

    let coordinator = Coordinator::new(
        format!("http://{}", addr),
        reduce.endpoint.clone(),
        test_config(),
    );
    let report = coordinator
        .run(&input, &dir.path().join("result.txt"))
        .await
        .unwrap();

    assert_eq!(report.phase, JobPhase::MapFailed);
    assert!(report.error.is_some());
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_input_is_a_local_error() {
    let coordinator = Coordinator::from_address("127.0.0.1", 1, 2, test_config());
    let dir = tempfile::tempdir().unwrap();

    let result = coordinator
        .run(&dir.path().join("absent.txt"), &dir.path().join("out.txt"))
        .await;

    assert!(result.is_err());
}

// ============================================================
// Map worker acknowledgments
// ============================================================

#[tokio::test]
async fn test_map_worker_acknowledges_each_chunk_then_batch() {
    let map = start_map_worker().await;
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("chunk000.txt");
    fs::write(&present, "x y x\n").unwrap();
    let missing = dir.path().join("chunk001.txt");

    let mut client = MapServiceClient::connect(map.endpoint.clone()).await.unwrap();
    let requests: Vec<MapInput> = [&present, &missing]
        .iter()
        .map(|path| MapInput {
            input_file_path: path.to_string_lossy().into_owned(),
            output_file_path: String::new(),
        })
        .collect();
    let mut inbound = client
        .map(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    let mut acks = Vec::new();
    while let Some(ack) = inbound.message().await.unwrap() {
        acks.push(ack);
    }

    let batch = acks.pop().expect("Stream should end with a batch signal");
    assert!(batch.input_file_path.is_empty());
    assert_eq!(batch.job_status, STATUS_FAILURE);

    acks.sort_by(|a, b| a.input_file_path.cmp(&b.input_file_path));
    assert_eq!(acks.len(), 2);
    assert_eq!(acks[0].job_status, STATUS_SUCCESS);
    assert_eq!(acks[1].job_status, STATUS_FAILURE);
    assert_eq!(
        fs::read_to_string(dir.path().join("map-chunk000.txt")).unwrap(),
        "x:2\ny:1\n"
    );
}
