//! Evaluation pipeline for a diagnosis chat model.
//!
//! - Splitting of prompt files and verification bundles into case blocks
//! - Redaction of case identifiers and ground truth before anything is sent
//! - Resumable batch runs with append-only success and failure logs
//! - Verification prompts for a judge model
//! - Verdict aggregation per department and CSV reports
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use dxeval_core::{blocks, BatchRunner, Case, DryRunBackend, Ledger, RunSettings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let text = std::fs::read_to_string("prompts.txt")?;
//! let cases: Vec<Case> = blocks::split_blocks(&text, blocks::PROMPT_SENTINEL)
//!     .iter()
//!     .enumerate()
//!     .map(|(idx, block)| Case::from_prompt_block(idx, block, "zero_shot_direct"))
//!     .collect();
//!
//! let ledger = Ledger::for_method(Path::new("out/results"), "zero_shot_direct");
//! let backend = Arc::new(DryRunBackend::diagnosis());
//! let runner = BatchRunner::new(backend, ledger, RunSettings::default());
//! let summary = runner.run(&cases).await?;
//! println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod blocks;
pub mod case;
pub mod config;
pub mod departments;
pub mod dry_run;
pub mod ledger;
pub mod prompt;
pub mod redact;
pub mod report;
pub mod runner;
pub mod verdict;

pub use aggregate::{aggregate_log, Aggregate, Tally};
pub use case::Case;
pub use config::EvalConfig;
pub use departments::{DepartmentRange, DepartmentTable, UNMATCHED};
pub use dry_run::DryRunBackend;
pub use ledger::{FailureKind, FailureRecord, Ledger, ResultRecord};
pub use prompt::VerificationWriter;
pub use runner::{BatchRunner, RunSettings, RunSummary};
pub use verdict::{extract_embedded_json, CheckOutcome, Verdict};
