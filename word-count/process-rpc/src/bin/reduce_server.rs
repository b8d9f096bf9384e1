// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use word_count_process_rpc::{logging, serve_reduce, shutdown_signal, ReduceWorker};

/// Reduce worker: merges map artifacts into the final word counts
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    port: u16,

    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let args = Args::parse();

    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr).await?;
    println!("Reduce Server listening on: {}", args.port);

    serve_reduce(listener, ReduceWorker::new(), shutdown_signal("reduce")).await?;

    println!("Terminating the Reduce server at port: {}", args.port);
    Ok(())
}
