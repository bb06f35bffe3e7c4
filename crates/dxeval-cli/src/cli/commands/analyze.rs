use dxeval_core::report::{format_summary, write_reports};
use dxeval_core::{aggregate_log, EvalConfig};
use tracing::info;

use crate::cli::args::AnalyzeArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: AnalyzeArgs) -> anyhow::Result<i32> {
    let config = EvalConfig::load(args.config.as_deref())?;
    let table = config.department_table();

    let aggregate = aggregate_log(&args.log, &table)?;
    info!(
        rows = aggregate.overall.total_rows,
        skipped = aggregate.skipped_lines,
        "aggregated judgment log"
    );

    let written = write_reports(&args.out, &aggregate, !args.no_rates)?;

    println!("{}", format_summary(&aggregate));
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(SUCCESS)
}
