//! Verdict tallies over a judgment log.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use dxeval_client::ChatReply;
use serde_json::Value;
use tracing::{debug, warn};

use crate::departments::{DepartmentTable, UNMATCHED};
use crate::verdict::{CheckOutcome, Verdict};

/// Fields searched for the judge's response text, in order.
const RESPONSE_FIELDS: [&str; 3] = ["output", "answer", "response"];

/// Counters for one group of judged records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total_rows: u64,
    pub top1_yes: u64,
    pub top1_no: u64,
    pub top1_unscorable: u64,
    pub invalid_top1: u64,
    pub top3_yes: u64,
    pub top3_no: u64,
    pub invalid_top3: u64,
    pub top5_yes: u64,
    pub top5_no: u64,
    pub invalid_top5: u64,
}

impl Tally {
    pub fn add(&mut self, verdict: &Verdict) {
        self.total_rows += 1;

        match verdict.top1 {
            Some(CheckOutcome::Yes) => self.top1_yes += 1,
            Some(CheckOutcome::No) => self.top1_no += 1,
            Some(CheckOutcome::Unscorable) => self.top1_unscorable += 1,
            None => self.invalid_top1 += 1,
        }
        match verdict.top3 {
            Some(CheckOutcome::Yes) => self.top3_yes += 1,
            Some(CheckOutcome::No) => self.top3_no += 1,
            _ => self.invalid_top3 += 1,
        }
        match verdict.top5 {
            Some(CheckOutcome::Yes) => self.top5_yes += 1,
            Some(CheckOutcome::No) => self.top5_no += 1,
            _ => self.invalid_top5 += 1,
        }
    }

    pub fn top1_accuracy(&self) -> f64 {
        percent(self.top1_yes, self.top1_no)
    }

    pub fn top3_hit_rate(&self) -> f64 {
        percent(self.top3_yes, self.top3_no)
    }

    pub fn top5_hit_rate(&self) -> f64 {
        percent(self.top5_yes, self.top5_no)
    }
}

/// `100 * yes / (yes + no)` rounded to two decimals; 0.0 without a denominator.
pub fn percent(yes: u64, no: u64) -> f64 {
    let denom = yes + no;
    if denom == 0 {
        return 0.0;
    }
    (100.0 * yes as f64 / denom as f64 * 100.0).round() / 100.0
}

/// Overall and per-department tallies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub overall: Tally,
    /// Departments in table order, then [`UNMATCHED`] when non-empty.
    pub by_department: Vec<(String, Tally)>,
    /// Lines that were not valid JSON objects.
    pub skipped_lines: u64,
}

/// Response text of a judgment record. Strings are used as-is; objects go
/// through the chat reply normalization.
pub fn response_text(record: &Value) -> Option<String> {
    let value = RESPONSE_FIELDS
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|v| !v.is_null())?;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => ChatReply::from_value(value)
            .assistant_text()
            .map(str::to_string),
        _ => None,
    }
}

/// Tally one JSON record into the aggregate.
fn add_record(
    aggregate: &mut Aggregate,
    unmatched: &mut Tally,
    table: &DepartmentTable,
    record: &Value,
) {
    let verdict = Verdict::from_text(response_text(record).as_deref());
    aggregate.overall.add(&verdict);

    let department = table.classify(record);
    if department == UNMATCHED {
        unmatched.add(&verdict);
    } else if let Some((_, tally)) = aggregate
        .by_department
        .iter_mut()
        .find(|(name, _)| name == department)
    {
        tally.add(&verdict);
    }
}

/// Aggregate the records of `reader`. Malformed lines are skipped.
pub fn aggregate_lines<R: BufRead>(reader: R, table: &DepartmentTable) -> Result<Aggregate> {
    let mut aggregate = Aggregate {
        by_department: table
            .ranges()
            .iter()
            .map(|r| (r.name.clone(), Tally::default()))
            .collect(),
        ..Aggregate::default()
    };
    let mut unmatched = Tally::default();

    for (n, line) in reader.lines().enumerate() {
        let line = line.context("failed to read judgment log")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(record @ Value::Object(_)) => {
                add_record(&mut aggregate, &mut unmatched, table, &record)
            }
            Ok(_) => {
                debug!(line = n + 1, "skipping non-object judgment line");
                aggregate.skipped_lines += 1;
            }
            Err(e) => {
                warn!(line = n + 1, error = %e, "skipping malformed judgment line");
                aggregate.skipped_lines += 1;
            }
        }
    }

    if unmatched.total_rows > 0 {
        aggregate.by_department.push((UNMATCHED.to_string(), unmatched));
    }
    Ok(aggregate)
}

/// Aggregate a judgment log file.
pub fn aggregate_log(path: &Path, table: &DepartmentTable) -> Result<Aggregate> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    aggregate_lines(BufReader::new(file), table)
        .with_context(|| format!("failed to aggregate {}", path.display()))
}
