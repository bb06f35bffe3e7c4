//! Evaluation configuration (`dxeval.yaml`).
//!
//! Every field is optional; missing fields fall back to the DxBench defaults.
//!
//! ```yaml
//! synonyms:
//!   - [CVA, stroke]
//! judge_inputs:
//!   zero_shot_direct: out/results/verification/zero_shot_direct.all.txt
//! departments:
//!   - { name: Surgery, start: 1, end: 93 }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::departments::{
    default_departments, default_id_fields, default_metadata_fields, DepartmentRange,
    DepartmentTable,
};

/// Pair of diagnosis names the judge should treat as equivalent.
pub type Synonym = (String, String);

pub fn default_synonyms() -> Vec<Synonym> {
    [
        ("CVA", "stroke"),
        ("MI/heart attack", "myocardial infarction"),
        ("CHD", "coronary artery disease"),
        ("PID", "pelvic inflammatory disease"),
        ("PCOS", "polycystic ovary syndrome"),
        ("UTI", "urinary tract infection"),
        ("DVT", "deep vein thrombosis"),
        ("eczema", "atopic dermatitis"),
    ]
    .into_iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Ordered department ranges; the first match wins.
    pub departments: Vec<DepartmentRange>,
    /// Record fields searched for a case number, highest priority first.
    pub id_fields: Vec<String>,
    pub metadata_fields: Vec<String>,
    pub synonyms: Vec<Synonym>,
    /// Method name to verification bundle, used by `judge` without `--input`.
    pub judge_inputs: BTreeMap<String, PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            departments: default_departments(),
            id_fields: default_id_fields(),
            metadata_fields: default_metadata_fields(),
            synonyms: default_synonyms(),
            judge_inputs: BTreeMap::new(),
        }
    }
}

impl EvalConfig {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EvalConfig =
            serde_yaml::from_str(content).context("failed to parse config YAML")?;

        for range in &config.departments {
            anyhow::ensure!(
                range.start <= range.end,
                "department '{}' has start {} after end {}",
                range.name,
                range.start,
                range.end
            );
        }
        Ok(config)
    }

    pub fn department_table(&self) -> DepartmentTable {
        DepartmentTable::new(
            self.departments.clone(),
            self.id_fields.clone(),
            self.metadata_fields.clone(),
        )
    }
}
