// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use std::path::PathBuf;
use word_count_core::{run_local, JobConfig};
use word_count_process_rpc::logging;

/// Runs the whole word count in this process, without any worker
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    input_file_path: PathBuf,
    output_file_path: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let args = Args::parse();
    let config = JobConfig::load_or_default(args.config.as_deref())?;

    let table = run_local(&args.input_file_path, &args.output_file_path, &config)?;

    println!(
        "Counted {} distinct words into {}",
        table.len(),
        args.output_file_path.display()
    );
    Ok(())
}
