// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{IoResultExt, Result};
use crate::words::is_valid_token;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Separator between token and count in every persisted table
pub const DELIMITER: char = ':';

/// Token -> occurrence count
/// Backed by a `BTreeMap` so serialization is always in ascending token order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: BTreeMap<String, u64>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str) {
        self.add_count(token, 1);
    }

    /// Adds `count` to `token`. A contribution that would overflow the total
    /// is dropped with a warning and `false` is returned.
    pub fn add_count(&mut self, token: &str, count: u64) -> bool {
        match self.counts.get_mut(token) {
            Some(total) => match total.checked_add(count) {
                Some(sum) => *total = sum,
                None => {
                    warn!(token, total = *total, count, "Skipping count that overflows");
                    return false;
                }
            },
            None => {
                self.counts.insert(token.to_string(), count);
            }
        }
        true
    }

    /// Sums `other` into this table
    pub fn merge(&mut self, other: &CountTable) {
        for (token, count) in &other.counts {
            self.add_count(token, *count);
        }
    }

    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(token, count)| (token.as_str(), *count))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_lines(path, self.iter())
    }

    /// Reads a persisted table, skipping lines that do not parse
    pub fn read_from(path: &Path) -> Result<Self> {
        let file = File::open(path).at(path)?;
        let reader = BufReader::new(file);
        let mut table = CountTable::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.at(path)?;
            match parse_line(&line) {
                Some((token, count)) => {
                    table.add_count(token, count);
                }
                None => warn!(
                    artifact = %path.display(),
                    line = index + 1,
                    content = %line,
                    "Skipping malformed count line"
                ),
            }
        }

        Ok(table)
    }

    pub fn into_final(self) -> FinalCountTable {
        let mut entries: Vec<(String, u64)> = self.counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        FinalCountTable { entries }
    }
}

impl<'a> FromIterator<&'a str> for CountTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = CountTable::new();
        for token in iter {
            table.add(token);
        }
        table
    }
}

/// Merged result ordered by count descending, then token ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalCountTable {
    entries: Vec<(String, u64)>,
}

impl FinalCountTable {
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, count)| *count)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_lines(
            path,
            self.entries.iter().map(|(token, count)| (token.as_str(), *count)),
        )
    }
}

fn parse_line(line: &str) -> Option<(&str, u64)> {
    let (token, count) = line.trim_end().split_once(DELIMITER)?;
    if !is_valid_token(token) {
        return None;
    }
    Some((token, count.parse().ok()?))
}

fn write_lines<'a>(path: &Path, entries: impl Iterator<Item = (&'a str, u64)>) -> Result<()> {
    let file = File::create(path).at(path)?;
    let mut writer = BufWriter::new(file);
    for (token, count) in entries {
        writeln!(writer, "{}{}{}", token, DELIMITER, count).at(path)?;
    }
    writer.flush().at(path)?;
    Ok(())
}
