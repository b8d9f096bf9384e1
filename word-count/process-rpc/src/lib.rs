// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod error;
pub use error::RpcError;

mod map_worker;
pub use map_worker::MapWorker;

mod reduce_worker;
pub use reduce_worker::ReduceWorker;

mod coordinator;
pub use coordinator::{Coordinator, JobReport};

mod server_runner;
pub use server_runner::{serve_map, serve_reduce, shutdown_signal};

pub mod logging;

pub mod rpc {
    pub mod proto {
        include!("../.generated/mapreduce.rs");
    }
}
