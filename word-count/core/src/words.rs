// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Text normalization shared by everything that turns lines into words

/// Strips everything except ASCII letters, digits and whitespace,
/// collapses whitespace runs to a single space, trims and lower-cases.
/// Vertical tab counts as whitespace.
pub fn normalize(line: &str) -> String {
    let mut normalized = String::with_capacity(line.len());
    let mut pending_space = false;

    for c in line.chars() {
        if is_space(c) {
            pending_space = !normalized.is_empty();
        } else if c.is_ascii_alphanumeric() {
            if pending_space {
                normalized.push(' ');
                pending_space = false;
            }
            normalized.push(c.to_ascii_lowercase());
        }
    }

    normalized
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0B'
}

/// Splits a normalized line on whitespace
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Full pipeline for one line; an absent line yields no words
pub fn extract_words(line: Option<&str>) -> Vec<String> {
    let Some(line) = line else {
        return Vec::new();
    };

    tokenize(&normalize(line))
        .into_iter()
        .filter(|token| is_valid_token(token))
        .map(str::to_ascii_lowercase)
        .collect()
}
