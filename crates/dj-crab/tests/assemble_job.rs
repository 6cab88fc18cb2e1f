use std::fs;
use std::path::PathBuf;

use dj_core::stable_hash_string;
use dj_crab::{assemble, load_input_list, render_json, render_python, FileLocation, JobSpec};
use tempfile::tempdir;

fn pbpb_spec() -> JobSpec {
    JobSpec {
        card: Some("cardDijetPbPb2018.input".into()),
        job_tag: "dijetPbPb2018_akCaloJets_part3".into(),
        output_file: None,
        input_list: PathBuf::from("PbPbData2018_part3.txt"),
        file_location: Some(FileLocation::Cern),
        tarball: "dijet5TeV.tar.gz".into(),
        max_runtime_min: 800,
        max_memory_mb: Some(1700),
        units_per_job: 1,
        primary_dataset: "diJetPbPbHistograms".into(),
        lfn_user: "jviinika".into(),
        whitelist: vec!["T2_CH_CERN".into()],
        storage_site: "T3_US_FNALLPC".into(),
        transfer_logs: false,
        force_whitelist: true,
        publication: false,
    }
}

fn inputs() -> Vec<String> {
    vec![
        "root://eoscms.cern.ch//store/group/skim_1.root".into(),
        "root://eoscms.cern.ch//store/group/skim_2.root".into(),
        "root://eoscms.cern.ch//store/group/skim_3.root".into(),
    ]
}

#[test]
fn assembly_is_pure() {
    let spec = pbpb_spec();
    let first = assemble(&spec, &inputs()).expect("assemble");
    let second = assemble(&spec, &inputs()).expect("assemble");
    assert_eq!(first, second);
    assert_eq!(
        stable_hash_string(&first).expect("hash"),
        stable_hash_string(&second).expect("hash")
    );
    assert_eq!(render_python(&first), render_python(&second));
}

#[test]
fn derived_fields_follow_the_literals() {
    let descriptor = assemble(&pbpb_spec(), &inputs()).expect("assemble");
    assert_eq!(descriptor.general.work_area, descriptor.general.request_name);
    assert_eq!(
        descriptor.job_type.script_args,
        [
            "card=cardDijetPbPb2018.input",
            "output=dijetPbPb2018_akCaloJets_part3.root",
            "location=1"
        ]
    );
    assert_eq!(
        descriptor.job_type.input_files,
        ["FrameworkJobReport.xml", "dijet5TeV.tar.gz", "cardDijetPbPb2018.input"]
    );
    assert_eq!(descriptor.data.total_units, 3);
    assert_eq!(
        descriptor.data.out_lfn_dir_base,
        "/store/user/jviinika/dijetPbPb2018_akCaloJets_part3"
    );
    let debug = descriptor.debug.expect("forced whitelist");
    assert_eq!(debug.extra_jdl, ["+CMS_ALLOW_OVERFLOW=False"]);
}

#[test]
fn python_rendering_lists_sections_in_order() {
    let descriptor = assemble(&pbpb_spec(), &inputs()).expect("assemble");
    let text = render_python(&descriptor);
    assert!(text.starts_with("from WMCore.Configuration import Configuration\n"));
    assert!(text.contains("config.JobType.pluginName = 'Analysis'\n"));
    assert!(text.contains("config.JobType.maxMemoryMB = 1700\n"));
    assert!(text.contains("config.Data.splitting = 'FileBased'\n"));
    assert!(text.contains("config.Data.totalUnits = 3\n"));
    assert!(text.contains("config.Data.publication = False\n"));
    assert!(text.contains("config.Debug.extraJDL = ['+CMS_ALLOW_OVERFLOW=False']\n"));
    assert!(!text.contains("transferLogs"));

    let order: Vec<usize> = ["General", "JobType", "Data", "Site", "Debug"]
        .iter()
        .map(|section| {
            text.find(&format!("config.section_(\"{section}\")"))
                .expect("section present")
        })
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn optional_sections_and_keys_are_omitted() {
    let mut spec = pbpb_spec();
    spec.force_whitelist = false;
    spec.file_location = None;
    spec.max_memory_mb = None;
    spec.transfer_logs = true;
    let descriptor = assemble(&spec, &inputs()).expect("assemble");
    assert!(descriptor.debug.is_none());
    assert_eq!(descriptor.job_type.script_args.len(), 2);

    let text = render_python(&descriptor);
    assert!(!text.contains("config.section_(\"Debug\")"));
    assert!(!text.contains("maxMemoryMB"));
    assert!(text.contains("config.General.transferLogs = True\n"));
}

#[test]
fn json_uses_submission_key_names() {
    let descriptor = assemble(&pbpb_spec(), &inputs()).expect("assemble");
    let json: serde_json::Value =
        serde_json::from_str(&render_json(&descriptor).expect("json")).expect("parse");
    assert_eq!(json["General"]["requestName"], "dijetPbPb2018_akCaloJets_part3");
    assert_eq!(json["JobType"]["maxMemoryMB"], 1700);
    assert_eq!(json["Data"]["outLFNDirBase"], "/store/user/jviinika/dijetPbPb2018_akCaloJets_part3");
    assert_eq!(json["Site"]["storageSite"], "T3_US_FNALLPC");
    assert_eq!(json["Debug"]["extraJDL"][0], "+CMS_ALLOW_OVERFLOW=False");
}

#[test]
fn invalid_literals_are_rejected() {
    let mut spec = pbpb_spec();
    spec.whitelist.clear();
    let err = assemble(&spec, &inputs()).unwrap_err();
    assert_eq!(err.info().code, "dj_crab.empty_whitelist");
    assert_eq!(err.info().context["job"], "dijetPbPb2018_akCaloJets_part3");

    let mut spec = pbpb_spec();
    spec.units_per_job = 0;
    assert_eq!(
        assemble(&spec, &inputs()).unwrap_err().info().code,
        "dj_crab.units_per_job"
    );

    assert_eq!(
        assemble(&pbpb_spec(), &[]).unwrap_err().info().code,
        "dj_crab.empty_input_list"
    );
}

#[test]
fn job_tags_that_are_not_plain_names_are_rejected() {
    for tag in ["../escape", "nested/tag", "with space", "dot.tag"] {
        let mut spec = pbpb_spec();
        spec.job_tag = tag.into();
        let err = assemble(&spec, &inputs()).unwrap_err();
        assert_eq!(err.info().code, "dj_crab.request_name", "tag {tag}");
    }

    let mut spec = pbpb_spec();
    spec.job_tag = "dijetTestPp_2019-04-18".into();
    assert!(assemble(&spec, &inputs()).is_ok());
}

#[test]
fn job_without_card_runs_the_script_bare() {
    let mut spec = pbpb_spec();
    spec.card = None;
    spec.tarball = "dijet5TeVpp.tar.gz".into();
    let descriptor = assemble(&spec, &inputs()).expect("assemble");
    assert!(descriptor.job_type.script_args.is_empty());
    assert_eq!(
        descriptor.job_type.input_files,
        ["FrameworkJobReport.xml", "dijet5TeVpp.tar.gz"]
    );

    let text = render_python(&descriptor);
    assert!(!text.contains("scriptArgs"));
    assert!(text.contains("config.JobType.inputFiles = ['FrameworkJobReport.xml', 'dijet5TeVpp.tar.gz']\n"));
    let json: serde_json::Value =
        serde_json::from_str(&render_json(&descriptor).expect("json")).expect("parse");
    assert!(json["JobType"].get("scriptArgs").is_none());
}

#[test]
fn blank_card_is_rejected() {
    let mut spec = pbpb_spec();
    spec.card = Some("  ".into());
    assert_eq!(
        assemble(&spec, &inputs()).unwrap_err().info().code,
        "dj_crab.card"
    );
}

#[test]
fn input_list_lines_are_trimmed_and_blanks_skipped() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("files.txt");
    fs::write(&path, "  a.root\n\nb.root  \r\n   \nc.root").expect("write");
    assert_eq!(
        load_input_list(&path).expect("list"),
        ["a.root", "b.root", "c.root"]
    );
}

#[test]
fn job_file_paths_resolve_against_its_directory() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("job.yaml");
    fs::write(
        &path,
        "card: cardDijet.input\njob_tag: t\ninput_list: lists/files.txt\nprimary_dataset: d\nlfn_user: u\nwhitelist: [T2_US_Purdue]\n",
    )
    .expect("write");
    let (spec, base) = JobSpec::load(&path).expect("load");
    assert_eq!(base, dir.path());
    assert_eq!(base.join(&spec.input_list), dir.path().join("lists/files.txt"));
}
