//! Mapping of case numbers to clinical departments.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bucket name for records that resolve to no department.
pub const UNMATCHED: &str = "_UNMATCHED";

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Inclusive range of case numbers belonging to one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRange {
    pub name: String,
    pub start: u64,
    pub end: u64,
}

impl DepartmentRange {
    pub fn new(name: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, n: u64) -> bool {
        self.start <= n && n <= self.end
    }
}

/// The DxBench department layout.
pub fn default_departments() -> Vec<DepartmentRange> {
    [
        ("Surgery", 1, 93),
        ("Obstetrics and Gynecology", 94, 189),
        ("Internal Medicine", 190, 288),
        ("Dentistry", 289, 360),
        ("Neurology", 361, 436),
        ("Oncology", 437, 492),
        ("Orthopedics", 493, 581),
        ("Pediatrics", 582, 640),
        ("Otorhinolaryngology", 641, 724),
        ("Reproductive and Men's Health", 725, 797),
        ("Dermatovenereology", 798, 918),
        ("Other", 919, 989),
        ("Psychology", 990, 1073),
        ("Hematology", 1074, 1121),
        ("Infectious Diseases and Immunology", 1122, 1148),
    ]
    .into_iter()
    .map(|(name, start, end)| DepartmentRange::new(name, start, end))
    .collect()
}

/// Record fields searched for a case number, highest priority first.
pub fn default_id_fields() -> Vec<String> {
    [
        "dataset_id",
        "id",
        "sample_id",
        "case_id",
        "qid",
        "question_id",
        "dx_id",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Nested objects searched when no top-level field has a number.
pub fn default_metadata_fields() -> Vec<String> {
    vec!["meta".to_string(), "metadata".to_string()]
}

/// Ordered department table plus the record fields used to find a number.
#[derive(Debug, Clone)]
pub struct DepartmentTable {
    ranges: Vec<DepartmentRange>,
    id_fields: Vec<String>,
    metadata_fields: Vec<String>,
}

impl Default for DepartmentTable {
    fn default() -> Self {
        Self::new(
            default_departments(),
            default_id_fields(),
            default_metadata_fields(),
        )
    }
}

impl DepartmentTable {
    pub fn new(
        ranges: Vec<DepartmentRange>,
        id_fields: Vec<String>,
        metadata_fields: Vec<String>,
    ) -> Self {
        Self {
            ranges,
            id_fields,
            metadata_fields,
        }
    }

    pub fn ranges(&self) -> &[DepartmentRange] {
        &self.ranges
    }

    /// First range containing `n`, in table order.
    pub fn department_for(&self, n: u64) -> Option<&str> {
        self.ranges
            .iter()
            .find(|r| r.contains(n))
            .map(|r| r.name.as_str())
    }

    /// Case number of a record: the last digit run of the first id field that
    /// has one, then the same search inside the first non-empty metadata object.
    ///
    /// Ids synthesized from the block position (`<method>_<idx:04>`) carry no
    /// case number and are ignored.
    pub fn case_number(&self, record: &Value) -> Option<u64> {
        let positional = positional_suffix(record);
        if let Some(n) = self.number_in(record, positional.as_deref()) {
            return Some(n);
        }

        let meta = self
            .metadata_fields
            .iter()
            .filter_map(|key| record.get(key))
            .find(|v| v.as_object().is_some_and(|o| !o.is_empty()))?;
        self.number_in(meta, None)
    }

    /// Department of a record, or [`UNMATCHED`].
    pub fn classify(&self, record: &Value) -> &str {
        self.case_number(record)
            .and_then(|n| self.department_for(n))
            .unwrap_or(UNMATCHED)
    }

    fn number_in(&self, object: &Value, positional: Option<&str>) -> Option<u64> {
        self.id_fields.iter().find_map(|key| match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if is_positional(s, positional) => None,
            Some(Value::String(s)) => last_number(s),
            Some(other) => last_number(&other.to_string()),
        })
    }
}

/// `_<idx:04>` suffix of a synthesized id, for records logged without a
/// dataset id.
fn positional_suffix(record: &Value) -> Option<String> {
    if record.get("dataset_id").is_some_and(|v| !v.is_null()) {
        return None;
    }
    let idx = record.get("idx")?.as_u64()?;
    Some(format!("_{:04}", idx))
}

fn is_positional(id: &str, suffix: Option<&str>) -> bool {
    suffix
        .and_then(|suffix| id.strip_suffix(suffix))
        .is_some_and(|method| !method.is_empty())
}

/// Last run of digits in `s`. Runs too large for `u64` count as absent.
pub fn last_number(s: &str) -> Option<u64> {
    DIGITS
        .find_iter(s)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}
