use std::fs;

use anyhow::Context;
use dxeval_core::blocks::{split_blocks, PROMPT_SENTINEL};
use dxeval_core::{BatchRunner, Case, DryRunBackend, EvalConfig, Ledger, VerificationWriter};
use tracing::info;

use super::{build_backend, ctrl_c, print_summary, read_input, run_settings};
use crate::cli::args::GenerateArgs;
use crate::exit_codes::SUCCESS;

pub async fn run(args: GenerateArgs) -> anyhow::Result<i32> {
    let backend = build_backend(&args.remote, args.dry_run, DryRunBackend::diagnosis)?;
    let config = EvalConfig::load(args.config.as_deref())?;

    let text = read_input(&args.input)?;
    let cases: Vec<Case> = split_blocks(&text, PROMPT_SENTINEL)
        .iter()
        .enumerate()
        .map(|(idx, block)| Case::from_prompt_block(idx, block, &args.method))
        .collect();
    info!(method = %args.method, cases = cases.len(), "loaded prompt file");

    let results_dir = args.out.join("results");
    fs::create_dir_all(&results_dir)
        .with_context(|| format!("failed to create {}", results_dir.display()))?;
    let ledger = Ledger::for_method(&results_dir, &args.method);
    let writer = VerificationWriter::create(
        &results_dir.join("verification"),
        &args.method,
        config.synonyms.clone(),
    )?;

    let runner = BatchRunner::new(backend, ledger, run_settings(&args.remote, args.dry_run))
        .with_verification(writer);
    let summary = runner.run_until(&cases, ctrl_c()).await?;

    print_summary(&args.method, &summary, runner.ledger());
    Ok(SUCCESS)
}
