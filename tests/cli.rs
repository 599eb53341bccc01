use assert_cmd::Command;
use predicates::str::contains;
use std::fs;

fn sizing() -> Command {
    Command::cargo_bin("sizing").expect("sizing bin")
}

#[test]
fn catalog_lists_tables_and_keys() {
    sizing()
        .arg("catalog")
        .assert()
        .success()
        .stdout(contains("[k_ld]"))
        .stdout(contains("Civil jet"))
        .stdout(contains("Jet transport"));
}

#[test]
fn top_reads_the_fitted_chart() {
    sizing()
        .args(["top", "--criterion", "prop_50ft", "--distance", "1500"])
        .assert()
        .success()
        .stdout(contains("TOP at 1500 ft"));
}

#[test]
fn unknown_criterion_fails() {
    sizing()
        .args(["top", "--criterion", "seaplane", "--distance", "1500"])
        .assert()
        .failure()
        .stderr(contains("unknown takeoff criterion"));
}

#[test]
fn weight_prints_json_estimate() {
    sizing()
        .args([
            "weight",
            "--case",
            "data/cases/regional_jet.toml",
            "--json",
        ])
        .assert()
        .success()
        .stdout(contains("takeoff_weight_lb"));
}

#[test]
fn run_writes_chart_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let chart = dir.path().join("chart.csv");

    sizing()
        .args([
            "run",
            "--case",
            "data/cases/light_single.toml",
            "--output",
            chart.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Design point"));

    let csv = fs::read_to_string(&chart).expect("chart csv");
    let header = "constraint,wing_loading_lb_ft2,power_loading_lb_hp";
    assert!(csv.starts_with(header));
    assert!(csv.contains("design_point"));
    let report = fs::read_to_string(dir.path().join("chart_report.json")).expect("sidecar");
    assert!(report.contains("\"design_point\""));
}

#[test]
fn constraints_stream_to_stdout() {
    sizing()
        .args(["constraints", "--case", "data/cases/light_single.toml"])
        .assert()
        .success()
        .stdout(contains("stall,"))
        .stdout(contains("cruise,"));
}

#[test]
fn weight_requires_a_mission_section() {
    let dir = tempfile::tempdir().expect("tempdir");
    let case = dir.path().join("empty.toml");
    fs::write(&case, "name = \"Empty\"\n").unwrap();
    sizing()
        .args(["weight", "--case", case.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("has no [mission] section"));
}
