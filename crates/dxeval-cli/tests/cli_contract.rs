#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ENV_VARS: [&str; 8] = [
    "DXEVAL_API_URL",
    "DXEVAL_API_KEY",
    "DXEVAL_BOT_ID",
    "DXEVAL_CONNECT_TIMEOUT",
    "DXEVAL_READ_TIMEOUT",
    "DXEVAL_MAX_RETRIES",
    "DXEVAL_PACING_MS",
    "DXEVAL_CONFIG",
];

fn dxeval() -> Command {
    let mut cmd = Command::cargo_bin("dxeval").expect("dxeval binary");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn read_jsonl(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("missing {}", path.display()))
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid JSON line"))
        .collect()
}

const PROMPTS: &str = "\
DxBench_94
Ectopic pregnancy
Patient Symptoms:
- Lower abdominal pain
======================
DxBench_361
Migraine
Patient Symptoms:
- Throbbing headache
======================
DxBench_500
Osteoarthritis
";

#[test]
fn missing_credentials_exit_2_before_any_io() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");

    dxeval()
        .args(["generate", "--input"])
        .arg(dir.path().join("does-not-exist.txt"))
        .arg("--out")
        .arg(&out)
        .args(["--method", "m"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("DXEVAL_API_KEY"));

    assert!(!out.exists(), "no output may be written without credentials");
}

#[test]
fn judge_without_inputs_is_config_error() {
    let dir = tempdir().unwrap();
    dxeval()
        .args(["judge", "--dry-run", "--out"])
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to judge"));
}

#[test]
fn dry_run_pipeline_end_to_end() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("prompts.txt");
    fs::write(&input, PROMPTS).unwrap();
    let out = dir.path().join("out");

    dxeval()
        .args(["generate", "--dry-run", "--method", "zero_shot_direct", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 cases, 0 skipped, 2 ok, 1 failed"));

    let results = read_jsonl(&out.join("results/zero_shot_direct.jsonl"));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "dxbench_94");
    assert_eq!(results[0]["ground_truth"], "Ectopic pregnancy");
    assert!(results[0]["output"].as_str().unwrap().contains("Example Dx"));

    // The third block has no body left after redaction.
    let failures = read_jsonl(&out.join("results/zero_shot_direct.failures.jsonl"));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["error"], "empty_body");

    let bundle = out.join("results/verification/zero_shot_direct.all.txt");
    assert!(out
        .join("results/verification/zero_shot_direct/dxbench_361.txt")
        .exists());

    // Resume: a second run skips everything already done.
    dxeval()
        .args(["generate", "--dry-run", "--method", "zero_shot_direct", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 skipped, 0 ok, 1 failed"));
    assert_eq!(
        read_jsonl(&out.join("results/zero_shot_direct.jsonl")).len(),
        2
    );

    dxeval()
        .args(["judge", "--dry-run", "--method", "zero_shot_direct", "--input"])
        .arg(&bundle)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let judgments_log = out.join("judgments/zero_shot_direct.jsonl");
    let judgments = read_jsonl(&judgments_log);
    assert_eq!(judgments.len(), 2);
    assert_eq!(judgments[1]["id"], "dxbench_361");

    let analysis = out.join("analysis");
    dxeval()
        .args(["analyze", "--log"])
        .arg(&judgments_log)
        .arg("--out")
        .arg(&analysis)
        .assert()
        .success()
        .stdout(predicate::str::contains("rows:  2"));

    let by_department =
        fs::read_to_string(analysis.join("judgment_counts_by_department_with_rates.csv")).unwrap();
    assert!(by_department
        .lines()
        .any(|l| l.starts_with("Obstetrics and Gynecology,1,1,0,")));
    assert!(by_department
        .lines()
        .any(|l| l.starts_with("Neurology,1,1,0,") && l.ends_with(",100.0,100.0,100.0")));
}

#[test]
fn analyze_fixture_counts() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("judged.jsonl");
    fs::write(
        &log,
        [
            r#"{"id":"dxbench_1","output":"{\"TOP1\":\"YES\",\"TOP3\":\"YES\",\"TOP5\":\"YES\"}"}"#,
            r#"{"id":"dxbench_2","output":"```json\n{\"TOP1\":\"no\",\"TOP3\":\"YES\",\"TOP5\":\"YES\"}\n```"}"#,
            r#"{"id":"dxbench_3","output":"{\"TOP1\":\"UNSCORABLE\",\"TOP3\":\"NO\",\"TOP5\":\"NO\"}"}"#,
            r#"{"id":"dxbench_4","output":"{\"TOP1\":\"maybe\"}"}"#,
            r#"{"id":"unknown","output":"{\"TOP1\":\"YES\",\"TOP3\":\"YES\",\"TOP5\":\"YES\"}"}"#,
            "not json",
        ]
        .join("\n"),
    )
    .unwrap();
    let out = dir.path().join("csv");

    dxeval()
        .args(["analyze", "--no-rates", "--log"])
        .arg(&log)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let overall = fs::read_to_string(out.join("judgment_counts_overall.csv")).unwrap();
    assert_eq!(overall.lines().nth(1), Some("5,2,1,1,1,3,1,1,3,1,1"));

    let by_department =
        fs::read_to_string(out.join("judgment_counts_by_department.csv")).unwrap();
    let lines: Vec<&str> = by_department.lines().collect();
    assert!(lines[0].starts_with("department,total_rows,"));
    assert_eq!(lines[1], "Surgery,4,1,1,1,1,2,1,1,2,1,1");
    assert_eq!(lines.last().copied(), Some("_UNMATCHED,1,1,0,0,0,1,0,0,1,0,0"));
    assert!(!out
        .join("judgment_counts_by_department_with_rates.csv")
        .exists());
}

#[test]
fn analyze_missing_log_is_error() {
    let dir = tempdir().unwrap();
    dxeval()
        .args(["analyze", "--log"])
        .arg(dir.path().join("nope.jsonl"))
        .arg("--out")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to open"));
}
