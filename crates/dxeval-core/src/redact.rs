//! Identifier / ground-truth extraction and redaction of case blocks.
//!
//! A case block typically starts with a header:
//!
//! ```text
//! DxBench_481
//! Acute appendicitis
//! Patient Symptoms:
//! ...
//! ```
//!
//! The first line is the identifier, the second is the ground-truth
//! diagnosis. Both must be removed before the block leaves the machine.

use once_cell::sync::Lazy;
use regex::Regex;

static ID_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*dxbench[_\- ]?(\d+)\s*$").expect("valid id regex"));

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:Patient\s+Symptoms|Explicit\s+Symptoms|Implicit\s+Symptoms|Symptoms|Clinical\s+Notes|Case)\s*:?",
    )
    .expect("valid section header regex")
});

/// Lines scanned for the ground truth when a block has no section header.
const FALLBACK_HEADER_LINES: usize = 5;

fn is_id_line(line: &str) -> bool {
    ID_LINE.is_match(line.trim())
}

/// Index of the first section-header line, if any.
fn section_start(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| SECTION_HEADER.is_match(line))
}

/// First identifier line anywhere in the block, normalized to `dxbench_<n>`.
pub fn extract_case_id(block: &str) -> Option<String> {
    block.lines().find_map(|line| {
        ID_LINE
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|digits| format!("dxbench_{}", digits.as_str()))
    })
}

/// First non-empty, non-identifier line of the header region.
pub fn extract_ground_truth(block: &str) -> Option<String> {
    let lines: Vec<&str> = block.lines().map(str::trim_end).collect();
    let header = match section_start(&lines) {
        Some(stop) => &lines[..stop],
        None => &lines[..lines.len().min(FALLBACK_HEADER_LINES)],
    };

    header
        .iter()
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !is_id_line(line))
        .map(str::to_string)
}

/// Remove identifier lines and the ground-truth line; keep everything from
/// the first section header onward untouched.
pub fn redact_for_api(block: &str) -> String {
    let lines: Vec<&str> = block.lines().collect();

    let kept: Vec<&str> = match section_start(&lines) {
        Some(stop) => {
            let (header, body) = lines.split_at(stop);
            let mut gt_removed = false;
            let mut kept = Vec::with_capacity(lines.len());
            for &line in header {
                let trimmed = line.trim();
                if is_id_line(trimmed) {
                    continue;
                }
                if !gt_removed && !trimmed.is_empty() {
                    gt_removed = true;
                    continue;
                }
                kept.push(line);
            }
            kept.extend_from_slice(body);
            kept
        }
        None => {
            // No header break: drop id lines, then the first non-empty line after one.
            let mut gt_removed = false;
            let mut saw_id = false;
            let mut kept = Vec::with_capacity(lines.len());
            for &line in &lines {
                let trimmed = line.trim();
                if !gt_removed {
                    if is_id_line(trimmed) {
                        saw_id = true;
                        continue;
                    }
                    if saw_id && !trimmed.is_empty() {
                        gt_removed = true;
                        continue;
                    }
                }
                kept.push(line);
            }
            kept
        }
    };

    format!("{}\n", kept.join("\n").trim())
}

/// Split a verification block into its `ID:` header value and the rest.
///
/// Leading blank lines are skipped. If the first non-empty line starts with
/// `id:` (any case) its value is returned and the line is removed from the
/// body.
pub fn split_id_header(block: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = block.lines().collect();
    let first = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());

    if let Some(line) = lines.get(first) {
        if line.trim().to_lowercase().starts_with("id:") {
            let id = line
                .split_once(':')
                .map(|(_, rest)| rest.trim().to_string())
                .filter(|id| !id.is_empty());
            let body = lines[first + 1..].join("\n");
            return (id, body.trim_start_matches('\n').to_string());
        }
    }

    (None, lines[first..].join("\n"))
}
