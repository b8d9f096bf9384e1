// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tokio::net::TcpListener;
use word_count_core::JobConfig;
use word_count_process_rpc::{logging, serve_map, shutdown_signal, MapWorker};

/// Map worker: maps the chunks streamed to it by a coordinator
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    port: u16,

    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// JSON job configuration; only `map_concurrency` is used here
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let args = Args::parse();
    let config = JobConfig::load_or_default(args.config.as_deref())?;

    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr).await?;
    println!("Map Server listening on: {}", args.port);

    serve_map(
        listener,
        MapWorker::new(config.map_concurrency),
        shutdown_signal("map"),
    )
    .await?;

    println!("Terminating the Map server at port: {}", args.port);
    Ok(())
}
