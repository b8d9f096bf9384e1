// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use std::path::PathBuf;
use word_count_core::{JobConfig, JobPhase};
use word_count_process_rpc::{logging, Coordinator};

/// Coordinator: chunks the input, drives the map and reduce workers
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    ip: String,
    map_port: u16,
    reduce_port: u16,
    input_file_path: PathBuf,
    output_file_path: PathBuf,

    /// JSON job configuration (chunk size, timeouts)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let args = Args::parse();
    let config = JobConfig::load_or_default(args.config.as_deref())?;

    let coordinator = Coordinator::from_address(&args.ip, args.map_port, args.reduce_port, config);
    let report = coordinator
        .run(&args.input_file_path, &args.output_file_path)
        .await?;

    if !report.map_succeeded() {
        println!(
            "Map tasks failed ({}/{} chunks completed). Please check server logs.",
            report.completed, report.chunks
        );
    } else {
        println!("All Map tasks completed successfully!");
        match report.phase {
            JobPhase::ReduceSucceeded => println!("Reduce task completed successfully!"),
            phase => println!("Reduce task failed. Status: {}", phase),
        }
    }
    if let Some(error) = &report.error {
        println!("Cause: {}", error);
    }

    Ok(())
}
