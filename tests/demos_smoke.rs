//! Runs the release tool over the demo jobs and maker plans shipped in the repository.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn dj_release() -> Command {
    let mut cmd = Command::cargo_bin("dj-release").expect("binary built");
    cmd.env_remove("DJ_LOG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn demo_jobs_render() {
    let out = tempdir().expect("tempdir");
    for (job, units) in [("dijetPbPb2018_part3.yaml", 5), ("dijetPp2017.yaml", 3)] {
        let output = dj_release()
            .args(["crab", "--format", "both", "--job"])
            .arg(repo_root().join("jobs").join(job))
            .arg("--out")
            .arg(out.path())
            .output()
            .expect("run crab");
        assert!(output.status.success(), "{job} failed");
        let summary: Value = serde_json::from_slice(&output.stdout).expect("json");
        assert_eq!(summary["total_units"], units, "{job}");
    }
    let pp = fs::read_to_string(out.path().join("crab_dijetPp2017_akPfJets_eta1v3.py")).expect("pp");
    assert!(pp.contains("config.General.transferLogs = True"));
    assert!(!pp.contains("extraJDL"));
}

#[test]
fn demo_plans_build() {
    for (plan, tables) in [("dijet_deta", 1), ("dijet_vn", 4)] {
        let out = tempdir().expect("tempdir");
        let output = dj_release()
            .args(["hepdata", "--plan"])
            .arg(repo_root().join("plans").join(plan).join("plan.yaml"))
            .arg("--out")
            .arg(out.path())
            .output()
            .expect("run hepdata");
        assert!(output.status.success(), "{plan} failed");
        let report: Value = serde_json::from_slice(&output.stdout).expect("json");
        let files = report["files"].as_array().map(Vec::len).unwrap_or_default();
        assert_eq!(files, tables + 1, "{plan}");
        assert!(out.path().join("submission.zip").exists());
    }
}
