//! Entry loading
//!
//! The analytics engine works on entries already in memory. This module reads
//! them from files exported by the symptom store:
//!
//! - **JSON**: a single array of entries (`[{...}, {...}]`)
//! - **JSONL**: one entry per line
//!
//! The format is detected from the first non-whitespace character.
//!
//! ## Resilience
//!
//! A JSONL line that fails to parse is skipped and reported in
//! [`LoadResult::warnings`]; the rest of the file still loads. A JSON array
//! file is parsed as a whole, so a malformed array is an error.

use crate::error::{Error, Result};
use crate::types::Entry;
use std::path::{Path, PathBuf};

/// Entries read from one or more files, plus non-fatal problems.
#[derive(Debug, Default)]
pub struct LoadResult {
    pub entries: Vec<Entry>,
    /// Lines that were skipped, as `path:line: reason`
    pub warnings: Vec<String>,
    /// Files that were read
    pub files: Vec<PathBuf>,
}

impl LoadResult {
    /// Append another result, keeping file order.
    pub fn merge(&mut self, other: LoadResult) {
        self.entries.extend(other.entries);
        self.warnings.extend(other.warnings);
        self.files.extend(other.files);
    }
}

/// Parse entries from file contents. `path` is used for messages only.
pub fn parse_entries(path: &Path, content: &str) -> Result<LoadResult> {
    let mut result = LoadResult {
        files: vec![path.to_path_buf()],
        ..Default::default()
    };

    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(result);
    }

    if trimmed.starts_with('[') {
        result.entries = serde_json::from_str(content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        return Ok(result);
    }

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Entry>(line) {
            Ok(entry) => result.entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed entry line"
                );
                result
                    .warnings
                    .push(format!("{}:{}: {}", path.display(), index + 1, e));
            }
        }
    }

    Ok(result)
}

/// Load entries from a JSON or JSONL file.
pub fn load_entries(path: &Path) -> Result<LoadResult> {
    let content = std::fs::read_to_string(path)?;
    let result = parse_entries(path, &content)?;
    tracing::debug!(
        path = %path.display(),
        entries = result.entries.len(),
        warnings = result.warnings.len(),
        "Loaded entry file"
    );
    Ok(result)
}

/// Load entries from every file matching a glob pattern, in path order.
///
/// A pattern that matches nothing yields an empty result.
pub fn load_entries_glob(pattern: &str) -> Result<LoadResult> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable path");
                None
            }
        })
        .collect();
    paths.sort();

    let mut combined = LoadResult::default();
    for path in paths {
        combined.merge(load_entries(&path)?);
    }
    Ok(combined)
}
