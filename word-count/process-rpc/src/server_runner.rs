// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MapWorker, ReduceWorker};
use std::future::Future;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{error, info};

/// Serves a map worker on an already bound listener until `shutdown` resolves
pub async fn serve_map(
    listener: TcpListener,
    worker: MapWorker,
    shutdown: impl Future<Output = ()>,
) -> Result<(), tonic::transport::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Map server listening");
    }
    Server::builder()
        .add_service(worker.into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}

/// Serves a reduce worker on an already bound listener until `shutdown` resolves
pub async fn serve_reduce(
    listener: TcpListener,
    worker: ReduceWorker,
    shutdown: impl Future<Output = ()>,
) -> Result<(), tonic::transport::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Reduce server listening");
    }
    Server::builder()
        .add_service(worker.into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
pub async fn shutdown_signal(name: &'static str) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(server = name, "Ctrl+C received, shutting down"),
        Err(e) => {
            error!(server = name, error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
