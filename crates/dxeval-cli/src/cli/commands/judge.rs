use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dxeval_client::ChatBackend;
use dxeval_core::blocks::{detect_sentinel, split_blocks, BUNDLE_SENTINEL, KNOWN_SENTINELS};
use dxeval_core::{BatchRunner, Case, DryRunBackend, EvalConfig, Ledger, RunSettings};
use tracing::{info, warn};

use super::{build_backend, ctrl_c, print_summary, read_input, run_settings};
use crate::cli::args::JudgeArgs;
use crate::exit_codes::SUCCESS;

/// Cases of a verification bundle. The separator is detected, so prompt-style
/// files work as input too.
pub fn load_bundle(text: &str, method: &str) -> Vec<Case> {
    let sentinel = detect_sentinel(text, &KNOWN_SENTINELS, BUNDLE_SENTINEL);
    split_blocks(text, sentinel)
        .iter()
        .enumerate()
        .map(|(idx, block)| Case::from_verification_block(idx, block, method))
        .collect()
}

pub async fn run(args: JudgeArgs) -> anyhow::Result<i32> {
    let backend = build_backend(&args.remote, args.dry_run, DryRunBackend::verdict)?;
    let config = EvalConfig::load(args.config.as_deref())?;

    let inputs: Vec<(String, PathBuf)> = match (&args.method, &args.input) {
        (Some(method), Some(input)) => vec![(method.clone(), input.clone())],
        _ => config
            .judge_inputs
            .iter()
            .map(|(method, path)| (method.clone(), path.clone()))
            .collect(),
    };
    anyhow::ensure!(
        !inputs.is_empty(),
        "nothing to judge: pass --input and --method, or list judge_inputs in the config"
    );

    let judgments_dir = args.out.join("judgments");
    fs::create_dir_all(&judgments_dir)
        .with_context(|| format!("failed to create {}", judgments_dir.display()))?;
    let settings = run_settings(&args.remote, args.dry_run);

    for (method, input) in &inputs {
        let interrupted = judge_one(&backend, &settings, &judgments_dir, method, input).await?;
        if interrupted {
            warn!("interrupted; remaining methods not judged");
            break;
        }
    }
    Ok(SUCCESS)
}

async fn judge_one(
    backend: &Arc<dyn ChatBackend>,
    settings: &RunSettings,
    judgments_dir: &Path,
    method: &str,
    input: &Path,
) -> anyhow::Result<bool> {
    let text = read_input(input)?;
    let cases = load_bundle(&text, method);
    info!(method, cases = cases.len(), input = %input.display(), "loaded verification bundle");

    let ledger = Ledger::for_method(judgments_dir, method);
    let runner = BatchRunner::new(Arc::clone(backend), ledger, settings.clone());
    let summary = runner.run_until(&cases, ctrl_c()).await?;

    print_summary(method, &summary, runner.ledger());
    Ok(summary.interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bundle_detects_dash_sentinel() {
        let dashes = "-".repeat(80);
        let text = format!(
            "ID: dxbench_1\n>> VERIFICATION PROMPT\nA\n{d}\n\nID: dxbench_2\n>> VERIFICATION PROMPT\nB\n{d}\n\n",
            d = dashes
        );
        let cases = load_bundle(&text, "m");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, "dxbench_1");
        assert_eq!(cases[1].body, ">> VERIFICATION PROMPT\nB");
    }

    #[test]
    fn test_load_bundle_without_ids() {
        let text = "first prompt\n======================\nsecond prompt\n";
        let cases = load_bundle(text, "least_to_most");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].id, "least_to_most_0001");
    }
}
