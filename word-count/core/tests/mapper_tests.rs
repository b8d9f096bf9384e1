// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fs;
use word_count_core::mapper::count_chunk;
use word_count_core::{map_chunk, MapReduceError};

#[test]
fn test_map_chunk_writes_sorted_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let chunk = dir.path().join("chunk001.txt");
    fs::write(&chunk, "The cat sat.\nThe Cat SAT!\n").unwrap();

    let artifact_path = map_chunk(&chunk).unwrap();

    assert_eq!(artifact_path, dir.path().join("map-chunk001.txt"));
    assert_eq!(
        fs::read_to_string(&artifact_path).unwrap(),
        "cat:2\nsat:2\nthe:2\n"
    );
}

#[test]
fn test_map_chunk_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let chunk = dir.path().join("chunk002.txt");
    fs::write(&chunk, "one two, two\nthree three three\n").unwrap();

    let first = fs::read(map_chunk(&chunk).unwrap()).unwrap();
    let second = fs::read(map_chunk(&chunk).unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_punctuation_only_chunk_yields_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let chunk = dir.path().join("chunk003.txt");
    fs::write(&chunk, "...\n!!! ???\n\n").unwrap();

    assert!(count_chunk(&chunk).unwrap().is_empty());
    let artifact_path = map_chunk(&chunk).unwrap();
    assert_eq!(fs::read_to_string(artifact_path).unwrap(), "");
}

#[test]
fn test_missing_chunk_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = map_chunk(&dir.path().join("chunk404.txt"));

    assert!(matches!(result, Err(MapReduceError::Io { .. })));
    assert!(!dir.path().join("map-chunk404.txt").exists());
}
