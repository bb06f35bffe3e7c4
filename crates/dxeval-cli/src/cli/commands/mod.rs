use super::args::*;

pub mod analyze;
pub mod generate;
pub mod judge;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dxeval_client::{ChatBackend, ChatClient};
use dxeval_core::{DryRunBackend, Ledger, RunSettings, RunSummary};
use tracing::info;

use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Generate(args) => generate::run(args).await,
        Command::Judge(args) => judge::run(args).await,
        Command::Analyze(args) => analyze::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Remote client, or a canned backend for dry runs. Credentials are checked
/// here, before any input is read.
pub(crate) fn build_backend(
    remote: &RemoteArgs,
    dry_run: bool,
    canned: fn() -> DryRunBackend,
) -> anyhow::Result<Arc<dyn ChatBackend>> {
    if dry_run {
        info!("dry run: no remote calls");
        return Ok(Arc::new(canned()));
    }
    let client = ChatClient::new(remote.client_config()).context("cannot create chat client")?;
    info!(url = client.base_url(), "using chat API");
    Ok(Arc::new(client))
}

pub(crate) fn run_settings(remote: &RemoteArgs, dry_run: bool) -> RunSettings {
    RunSettings {
        pacing: if dry_run {
            std::time::Duration::ZERO
        } else {
            remote.pacing()
        },
    }
}

pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))
}

const INTERRUPT_NOTICE: &str =
    "Interrupted; the case in flight is abandoned and will be retried on the next run.";

/// Completes on the first Ctrl-C.
pub(crate) async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("{}", INTERRUPT_NOTICE);
    } else {
        // No signal handler available: never interrupt.
        std::future::pending::<()>().await;
    }
}

pub(crate) fn print_summary(method: &str, summary: &RunSummary, ledger: &Ledger) {
    println!(
        "{}: {} cases, {} skipped, {} ok, {} failed{}",
        method,
        summary.total,
        summary.skipped,
        summary.succeeded,
        summary.failed,
        if summary.interrupted {
            format!(", interrupted with {} pending", summary.pending())
        } else {
            String::new()
        }
    );
    println!("  results:  {}", ledger.results_path().display());
    println!("  failures: {}", ledger.failures_path().display());
}
