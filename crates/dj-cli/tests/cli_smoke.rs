use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

const RESULTS: &str = r#"{
  "objects": {
    "py_deta_all_0": {"kind": "hist1d",
      "x_edges": [[0.0, 0.2], [0.2, 0.4], [0.4, 1.0], [1.0, 1.2]],
      "y": [4.0, 3.0, 2.0, 1.0], "dy": [0.4, 0.3, 0.2, 0.1]},
    "dijetV2Centrality": {"kind": "graph",
      "x": [5.0, 20.0], "dx": [5.0, 10.0], "y": [0.05, 0.06], "dy": [0.003, 0.004]}
  }
}"#;

fn dj_release() -> Command {
    let mut cmd = Command::cargo_bin("dj-release").expect("binary built");
    cmd.env_remove("DJ_LOG").env_remove("RUST_LOG").env_remove("DJ_LOG_FORMAT");
    cmd
}

#[test]
fn version_prints_package_version() {
    dj_release()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn inspect_lists_objects_with_kinds() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("results.json");
    fs::write(&input, RESULTS).expect("write");

    let output = dj_release()
        .args(["inspect", "--input"])
        .arg(&input)
        .output()
        .expect("run");
    assert!(output.status.success());
    let listing: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(listing["objects"][0]["name"], "dijetV2Centrality");
    assert_eq!(listing["objects"][0]["kind"], "graph");
    assert_eq!(listing["objects"][1]["kind"], "hist1d");
}

#[test]
fn trim_reports_removed_bins() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("results.json");
    fs::write(&input, RESULTS).expect("write");

    let output = dj_release()
        .args(["trim", "--name", "py_deta_all_0", "--max-edge", "1.1", "--input"])
        .arg(&input)
        .output()
        .expect("run");
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(body["report"]["over"], 1);
    assert_eq!(body["report"]["retained"], 3);
    assert_eq!(body["series"]["values"].as_array().map(Vec::len), Some(3));
}

#[test]
fn missing_object_exits_with_failure() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("results.json");
    fs::write(&input, RESULTS).expect("write");

    dj_release()
        .args(["-q", "trim", "--name", "py_deta_all_9", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("dj_hist.missing_object"));
}

#[test]
fn crab_writes_python_and_json() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("files.txt"), "a.root\nb.root\n").expect("list");
    let job = dir.path().join("job.yaml");
    fs::write(
        &job,
        "card: cardDijet.input\njob_tag: dijetTest\ninput_list: files.txt\nfile_location: purdue\nprimary_dataset: diJetHistograms\nlfn_user: tester\nwhitelist: [T2_US_Purdue]\n",
    )
    .expect("job");
    let out = dir.path().join("crab");

    let output = dj_release()
        .args(["crab", "--format", "both", "--job"])
        .arg(&job)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("run");
    assert!(output.status.success());
    let summary: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(summary["total_units"], 2);
    assert_eq!(summary["descriptor_hash"].as_str().map(str::len), Some(64));

    let python = fs::read_to_string(out.join("crab_dijetTest.py")).expect("python");
    assert!(python.contains("config.JobType.scriptArgs = ['card=cardDijet.input', 'output=dijetTest.root', 'location=0']"));
    assert!(python.contains("config.Data.userInputFiles = ['a.root', 'b.root']"));
    assert!(out.join("crab_dijetTest.json").exists());
}

#[test]
fn crab_rejects_tag_that_would_leave_the_output_directory() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("files.txt"), "a.root\n").expect("list");
    let job = dir.path().join("job.yaml");
    fs::write(
        &job,
        "job_tag: ../outside\ninput_list: files.txt\nprimary_dataset: d\nlfn_user: tester\nwhitelist: [T2_US_Purdue]\n",
    )
    .expect("job");
    let out = dir.path().join("nested").join("crab");

    dj_release()
        .args(["crab", "--job"])
        .arg(&job)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dj_crab.request_name"));
    assert!(!dir.path().join("nested").exists());
}

#[test]
fn hepdata_writes_submission_and_provenance() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("results.json"), RESULTS).expect("results");
    let plan = dir.path().join("plan.yaml");
    fs::write(
        &plan,
        r#"
comment: Test submission.
sources:
  deta: {file: results.json, kind: hist1d, names: [py_deta_all_0]}
tables:
  - name: Figure 1
    x: {name: "$\\Delta\\eta$", from_source: deta}
    trim: {max_upper_edge: 1.1}
    series:
      - {name: Yield, source: deta}
"#,
    )
    .expect("plan");
    let out = dir.path().join("hepdata");

    dj_release()
        .args(["hepdata", "--no-archive", "--plan"])
        .arg(&plan)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("figure_1.yaml"));

    assert!(out.join("submission.yaml").exists());
    assert!(!out.join("submission.zip").exists());
    let provenance: Value =
        serde_json::from_str(&fs::read_to_string(out.join("provenance.json")).expect("read"))
            .expect("json");
    assert_eq!(provenance["input_hashes"].as_object().map(|m| m.len()), Some(1));
    assert!(provenance["tool_versions"]["dj-release"].is_string());

    let table: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(out.join("figure_1.yaml")).expect("read"))
            .expect("yaml");
    let values = table["dependent_variables"][0]["values"]
        .as_sequence()
        .map(Vec::len);
    assert_eq!(values, Some(3));
}

#[test]
fn hepdata_without_output_directory_fails() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("results.json"), RESULTS).expect("results");
    let plan = dir.path().join("plan.yaml");
    fs::write(
        &plan,
        "sources:\n  deta: {file: results.json, kind: hist1d, names: [py_deta_all_0]}\ntables:\n  - name: F\n    x: {name: x, from_source: deta}\n    series: [{name: y, source: deta}]\n",
    )
    .expect("plan");

    dj_release()
        .args(["hepdata", "--plan"])
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("dj_cli.no_output"));
}
