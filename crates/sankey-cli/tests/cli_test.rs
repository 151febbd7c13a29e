use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> String {
    let path = repo_root().join("fixtures").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path.to_string_lossy().into_owned()
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("sankey-cli"))
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn process_prints_the_processed_graph() {
    let output = cli()
        .args(["process", fixture("budget.json").as_str()])
        .output()
        .expect("run");
    assert!(output.status.success());

    let v = stdout_json(&output);
    assert_eq!(v["nodes"].as_array().map(Vec::len), Some(8));
    assert_eq!(v["links"].as_array().map(Vec::len), Some(7));
    assert_eq!(v["report"]["validated"], Value::Bool(true));
    assert_eq!(v["metadata"]["currency"], "EUR");
}

#[test]
fn process_reports_every_validation_problem() {
    let output = cli()
        .args([fixture("invalid.json")])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Duplicate node ID: 'A'"), "{stderr}");
}

#[test]
fn unbalanced_graph_still_processes_with_warnings() {
    let output = cli()
        .args(["process", fixture("unbalanced.json").as_str()])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("warning:").count(), 2, "{stderr}");
}

#[test]
fn no_conservation_skips_the_check() {
    let output = cli()
        .args(["--no-conservation", fixture("unbalanced.json").as_str()])
        .output()
        .expect("run");
    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    assert_eq!(stdout_json(&output)["report"]["validated"], Value::Bool(false));
}

#[test]
fn check_passes_balanced_and_fails_unbalanced() {
    cli()
        .args(["check", fixture("budget.json").as_str()])
        .assert()
        .success();

    let output = cli()
        .args(["check", fixture("unbalanced.json").as_str()])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Warnings:"), "{stdout}");
    assert!(stdout.contains("'A' sends 50 but is worth 100"), "{stdout}");
}

#[test]
fn check_lists_fatal_problems() {
    let output = cli()
        .args(["check", fixture("invalid.json").as_str()])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Critical:"), "{stdout}");
    assert!(stdout.contains("Duplicate node ID: 'A'"), "{stdout}");
}

#[test]
fn report_is_json() {
    let output = cli()
        .args(["report", "--pretty", fixture("budget.json").as_str()])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v = stdout_json(&output);
    assert_eq!(v["summary"]["nodeCount"], 8);
    assert_eq!(v["conservation"]["valid"], Value::Bool(true));
}

#[test]
fn layout_uses_canvas_and_config_file() {
    let output = cli()
        .args([
            "layout",
            "--width",
            "1200",
            "--height",
            "900",
            "--config",
            fixture("layout-config.json").as_str(),
            fixture("budget.json").as_str(),
        ])
        .output()
        .expect("run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let v = stdout_json(&output);
    assert_eq!(v["layoutInfo"]["dimensions"]["width"], 1200.0);
    assert_eq!(v["nodes"][0]["width"], 24.0);
    let x0 = v["nodes"][0]["x"].as_f64().unwrap();
    let x_budget = v["nodes"][2]["x"].as_f64().unwrap();
    assert!(x0 < x_budget);
}

#[test]
fn layout_reads_csv_from_stdin() {
    let csv = fs::read_to_string(fixture("flows.csv")).expect("read csv");
    cli()
        .args(["layout", "--csv", "-"])
        .write_stdin(csv)
        .assert()
        .success();
}

#[test]
fn import_converts_a_flow_list() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("flows.csv");
    fs::copy(fixture("flows.csv"), &input).expect("copy fixture");

    let output = cli()
        .args(["import", input.to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success());

    let v = stdout_json(&output);
    let nodes = v["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 8);
    assert!(nodes.iter().any(|n| n["id"] == "Rent, flat" && n["depth"] == 3));
    assert_eq!(v["links"].as_array().map(Vec::len), Some(7));
}

#[test]
fn bad_flow_list_reports_the_line() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("bad.csv");
    fs::write(&input, "A,B,10\nB,C,lots\n").expect("write");

    let output = cli()
        .args(["import", input.to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
}

#[test]
fn usage_errors_exit_with_status_2() {
    let output = cli().args(["--bogus"]).output().expect("run");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE:"));

    let output = cli().args(["layout", "--width"]).output().expect("run");
    assert_eq!(output.status.code(), Some(2));
}
