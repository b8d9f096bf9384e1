// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fs;
use std::time::Duration;
use word_count_core::{JobConfig, MapReduceError};

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "chunk_size": 64 }"#).unwrap();

    let config = JobConfig::load(&path).unwrap();

    assert_eq!(config.chunk_size, 64);
    assert_eq!(config.map_timeout(), Duration::from_secs(60));
    assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
}

#[test]
fn test_zero_chunk_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "chunk_size": 0 }"#).unwrap();

    assert!(matches!(
        JobConfig::load(&path),
        Err(MapReduceError::InvalidConfig(_))
    ));
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "chunk_size = 64").unwrap();

    assert!(matches!(
        JobConfig::load(&path),
        Err(MapReduceError::ConfigParse { .. })
    ));
}

#[test]
fn test_no_path_means_defaults() {
    assert_eq!(
        JobConfig::load_or_default(None).unwrap(),
        JobConfig::default()
    );
}
