//! Append-only JSONL logs for a batch run.
//!
//! Every append opens the file, writes one complete line and flushes, so an
//! interrupted run always leaves a valid prefix of records.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A successfully completed remote call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub idx: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
    /// Normalized assistant text.
    pub output: String,
    /// Raw reply payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
}

/// Stable failure kinds written to the failure log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyBody,
    CreateSessionFailed,
    SendMessageFailed,
}

/// A case that could not be completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub idx: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    pub error: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Success and failure logs of one method.
#[derive(Debug, Clone)]
pub struct Ledger {
    results: PathBuf,
    failures: PathBuf,
}

impl Ledger {
    pub fn new(results: impl Into<PathBuf>, failures: impl Into<PathBuf>) -> Self {
        Self {
            results: results.into(),
            failures: failures.into(),
        }
    }

    /// `<dir>/<method>.jsonl` and `<dir>/<method>.failures.jsonl`.
    pub fn for_method(dir: &Path, method: &str) -> Self {
        Self::new(
            dir.join(format!("{}.jsonl", method)),
            dir.join(format!("{}.failures.jsonl", method)),
        )
    }

    pub fn results_path(&self) -> &Path {
        &self.results
    }

    pub fn failures_path(&self) -> &Path {
        &self.failures
    }

    /// Ids already present in the success log. A missing log is an empty set.
    pub fn load_done(&self) -> Result<HashSet<String>> {
        let mut done = HashSet::new();
        if !self.results.exists() {
            return Ok(done);
        }

        let file = File::open(&self.results)
            .with_context(|| format!("failed to open {}", self.results.display()))?;
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("failed to read {}", self.results.display()))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<serde_json::Value>(line) {
                Ok(value) => match value.get("id") {
                    Some(serde_json::Value::String(id)) => {
                        done.insert(id.clone());
                    }
                    Some(serde_json::Value::Number(id)) => {
                        done.insert(id.to_string());
                    }
                    _ => debug!(line = n + 1, "result line without id"),
                },
                Err(e) => warn!(line = n + 1, error = %e, "skipping malformed result line"),
            }
        }

        Ok(done)
    }

    pub fn append_result(&self, record: &ResultRecord) -> Result<()> {
        append_jsonl(&self.results, record)
    }

    pub fn append_failure(&self, record: &FailureRecord) -> Result<()> {
        append_jsonl(&self.failures, record)
    }
}

/// Append one JSON line and flush.
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut line = serde_json::to_string(record).context("failed to serialize record")?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {} for append", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    file.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
