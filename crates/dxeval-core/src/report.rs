//! CSV reports and console summary for an aggregate.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;

use crate::aggregate::{Aggregate, Tally};

pub const OVERALL_CSV: &str = "judgment_counts_overall.csv";
pub const BY_DEPARTMENT_CSV: &str = "judgment_counts_by_department.csv";
pub const BY_DEPARTMENT_RATES_CSV: &str = "judgment_counts_by_department_with_rates.csv";

const COUNT_COLUMNS: [&str; 11] = [
    "total_rows",
    "TOP1_YES",
    "TOP1_NO",
    "TOP1_UNSCORABLE",
    "invalid_TOP1",
    "TOP3_YES",
    "TOP3_NO",
    "invalid_TOP3",
    "TOP5_YES",
    "TOP5_NO",
    "invalid_TOP5",
];

const RATE_COLUMNS: [&str; 3] = ["TOP1_ACC_%", "TOP3_HIT_%", "TOP5_HIT_%"];

fn counts(tally: &Tally) -> [String; 11] {
    [
        tally.total_rows,
        tally.top1_yes,
        tally.top1_no,
        tally.top1_unscorable,
        tally.invalid_top1,
        tally.top3_yes,
        tally.top3_no,
        tally.invalid_top3,
        tally.top5_yes,
        tally.top5_no,
        tally.invalid_top5,
    ]
    .map(|n| n.to_string())
}

/// Rates keep a trailing `.0` for whole numbers.
fn rates(tally: &Tally) -> [String; 3] {
    [
        tally.top1_accuracy(),
        tally.top3_hit_rate(),
        tally.top5_hit_rate(),
    ]
    .map(|r| format!("{:?}", r))
}

fn create_writer(path: &Path) -> Result<Writer<fs::File>> {
    Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))
}

fn write_overall(path: &Path, aggregate: &Aggregate) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(COUNT_COLUMNS)?;
    writer.write_record(counts(&aggregate.overall))?;
    writer.flush()?;
    Ok(())
}

fn write_by_department(path: &Path, aggregate: &Aggregate, with_rates: bool) -> Result<()> {
    let mut writer = create_writer(path)?;

    let mut header = vec!["department"];
    header.extend(COUNT_COLUMNS);
    if with_rates {
        header.extend(RATE_COLUMNS);
    }
    writer.write_record(&header)?;

    for (department, tally) in &aggregate.by_department {
        let mut row = vec![department.clone()];
        row.extend(counts(tally));
        if with_rates {
            row.extend(rates(tally));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the report files into `dir` and return their paths.
pub fn write_reports(dir: &Path, aggregate: &Aggregate, with_rates: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = vec![dir.join(OVERALL_CSV), dir.join(BY_DEPARTMENT_CSV)];
    write_overall(&written[0], aggregate)?;
    write_by_department(&written[1], aggregate, false)?;

    if with_rates {
        let path = dir.join(BY_DEPARTMENT_RATES_CSV);
        write_by_department(&path, aggregate, true)?;
        written.push(path);
    }
    Ok(written)
}

/// Human-readable summary of the overall tally.
pub fn format_summary(aggregate: &Aggregate) -> String {
    let t = &aggregate.overall;
    let mut out = format!(
        "=== Judgment summary ===\n\
         rows:  {}\n\
         TOP1:  YES={} NO={} UNSCORABLE={} invalid={}  acc={:.2}%\n\
         TOP3:  YES={} NO={} invalid={}  hit={:.2}%\n\
         TOP5:  YES={} NO={} invalid={}  hit={:.2}%",
        t.total_rows,
        t.top1_yes,
        t.top1_no,
        t.top1_unscorable,
        t.invalid_top1,
        t.top1_accuracy(),
        t.top3_yes,
        t.top3_no,
        t.invalid_top3,
        t.top3_hit_rate(),
        t.top5_yes,
        t.top5_no,
        t.invalid_top5,
        t.top5_hit_rate(),
    );
    if aggregate.skipped_lines > 0 {
        out.push_str(&format!("\nskipped lines: {}", aggregate.skipped_lines));
    }
    out
}
