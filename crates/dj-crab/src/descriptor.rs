//! Assembly of the grid job descriptor.

use std::fs;
use std::path::Path;

use dj_core::errors::{DjError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::spec::JobSpec;

const PLUGIN_NAME: &str = "Analysis";
const PSET_NAME: &str = "PSet.py";
const SCRIPT_EXE: &str = "compileAndRun.sh";
const JOB_REPORT: &str = "FrameworkJobReport.xml";
const SPLITTING: &str = "FileBased";
const NO_OVERFLOW: &str = "+CMS_ALLOW_OVERFLOW=False";

/// A literal value of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// Quoted string.
    Text(String),
    /// Integer.
    Int(u64),
    /// Boolean.
    Bool(bool),
    /// List of strings.
    List(Vec<String>),
}

/// Request naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSection {
    /// Request name; the job tag.
    pub request_name: String,
    /// Local work area; same as the request name.
    pub work_area: String,
    /// Copy job logs to the storage site.
    pub transfer_logs: bool,
}

/// What each job runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTypeSection {
    /// Always `Analysis`.
    pub plugin_name: String,
    /// Always `PSet.py`.
    pub pset_name: String,
    /// Wrapper script run by every job.
    pub script_exe: String,
    /// `key=value` arguments of the script; empty for a job without a card.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script_args: Vec<String>,
    /// Files shipped with every job.
    pub input_files: Vec<String>,
    /// Files collected from every job.
    pub output_files: Vec<String>,
    /// Wall-clock limit per job, in minutes.
    pub max_job_runtime_min: u64,
    /// Memory limit per job.
    #[serde(rename = "maxMemoryMB", skip_serializing_if = "Option::is_none")]
    pub max_memory_mb: Option<u64>,
}

/// Input files and their split into jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSection {
    /// Input files, one unit each.
    pub user_input_files: Vec<String>,
    /// Always `FileBased`.
    pub splitting: String,
    /// Files per job.
    pub units_per_job: u64,
    /// Number of input files.
    pub total_units: u64,
    /// Dataset name of the output.
    pub output_primary_dataset: String,
    /// `/store/user/<user>/<request name>`.
    #[serde(rename = "outLFNDirBase")]
    pub out_lfn_dir_base: String,
    /// Publish the output dataset.
    pub publication: bool,
}

/// Where jobs run and where their output goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSection {
    /// Sites allowed to run the jobs.
    pub whitelist: Vec<String>,
    /// Site receiving the output.
    pub storage_site: String,
}

/// Extra scheduler directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSection {
    /// Raw JDL lines.
    #[serde(rename = "extraJDL")]
    pub extra_jdl: Vec<String>,
}

/// Configuration handed to the grid submission service. Built once by
/// [`assemble`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDescriptor {
    /// `General` section.
    pub general: GeneralSection,
    /// `JobType` section.
    pub job_type: JobTypeSection,
    /// `Data` section.
    pub data: DataSection,
    /// `Site` section.
    pub site: SiteSection,
    /// `Debug` section, present when the whitelist is forced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugSection>,
}

fn text(value: &str) -> ConfigValue {
    ConfigValue::Text(value.to_string())
}

fn list(values: &[String]) -> ConfigValue {
    ConfigValue::List(values.to_vec())
}

impl JobDescriptor {
    /// Sections in submission order, each with its keys in assignment order.
    pub fn sections(&self) -> Vec<(&'static str, Vec<(&'static str, ConfigValue)>)> {
        let general = &self.general;
        let job = &self.job_type;
        let data = &self.data;
        let site = &self.site;

        let mut general_keys = vec![
            ("requestName", text(&general.request_name)),
            ("workArea", text(&general.work_area)),
        ];
        if general.transfer_logs {
            general_keys.push(("transferLogs", ConfigValue::Bool(true)));
        }

        let mut job_keys = vec![
            ("pluginName", text(&job.plugin_name)),
            ("psetName", text(&job.pset_name)),
            ("scriptExe", text(&job.script_exe)),
        ];
        if !job.script_args.is_empty() {
            job_keys.push(("scriptArgs", list(&job.script_args)));
        }
        job_keys.extend([
            ("inputFiles", list(&job.input_files)),
            ("outputFiles", list(&job.output_files)),
            ("maxJobRuntimeMin", ConfigValue::Int(job.max_job_runtime_min)),
        ]);
        if let Some(memory) = job.max_memory_mb {
            job_keys.push(("maxMemoryMB", ConfigValue::Int(memory)));
        }

        let mut sections = vec![
            ("General", general_keys),
            ("JobType", job_keys),
            (
                "Data",
                vec![
                    ("userInputFiles", list(&data.user_input_files)),
                    ("splitting", text(&data.splitting)),
                    ("unitsPerJob", ConfigValue::Int(data.units_per_job)),
                    ("totalUnits", ConfigValue::Int(data.total_units)),
                    ("outputPrimaryDataset", text(&data.output_primary_dataset)),
                    ("outLFNDirBase", text(&data.out_lfn_dir_base)),
                    ("publication", ConfigValue::Bool(data.publication)),
                ],
            ),
            (
                "Site",
                vec![
                    ("whitelist", list(&site.whitelist)),
                    ("storageSite", text(&site.storage_site)),
                ],
            ),
        ];
        if let Some(debug) = &self.debug {
            sections.push(("Debug", vec![("extraJDL", list(&debug.extra_jdl))]));
        }
        sections
    }
}

fn job_error(code: &str, job: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message).with_context("job", job)
}

fn validate(spec: &JobSpec, input_files: &[String]) -> Result<(), DjError> {
    let job = spec.job_tag.as_str();
    if job.trim().is_empty() {
        return Err(DjError::Job(ErrorInfo::new(
            "dj_crab.request_name",
            "job tag is empty",
        )));
    }
    if !job
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DjError::Job(
            job_error(
                "dj_crab.request_name",
                job,
                format!("job tag `{job}` may only contain letters, digits, `_` and `-`"),
            )
            .with_hint("the tag names the request, the work area and the written files"),
        ));
    }
    if spec.card.as_deref().is_some_and(|card| card.trim().is_empty()) {
        return Err(DjError::Job(job_error("dj_crab.card", job, "analysis card is empty")));
    }
    if spec.lfn_user.trim().is_empty() {
        return Err(DjError::Job(job_error(
            "dj_crab.lfn_user",
            job,
            "grid user for the output area is empty",
        )));
    }
    if input_files.is_empty() {
        return Err(DjError::Job(
            job_error(
                "dj_crab.empty_input_list",
                job,
                format!("input list `{}` names no files", spec.input_list.display()),
            )
            .with_path(&spec.input_list),
        ));
    }
    if spec.units_per_job == 0 {
        return Err(DjError::Job(job_error(
            "dj_crab.units_per_job",
            job,
            "units per job must be positive",
        )));
    }
    if spec.whitelist.is_empty() {
        return Err(DjError::Job(
            job_error("dj_crab.empty_whitelist", job, "site whitelist is empty")
                .with_hint("list at least one site, e.g. T2_CH_CERN"),
        ));
    }
    Ok(())
}

/// Builds the descriptor of one production from its literals and input files.
///
/// Has no side effects: the same arguments always yield an equal descriptor.
pub fn assemble(spec: &JobSpec, input_files: &[String]) -> Result<JobDescriptor, DjError> {
    validate(spec, input_files)?;

    let output_file = spec.output_file();
    let mut script_args = Vec::new();
    let mut shipped_files = vec![JOB_REPORT.to_string(), spec.tarball.clone()];
    match &spec.card {
        Some(card) => {
            script_args.push(format!("card={card}"));
            script_args.push(format!("output={output_file}"));
            if let Some(location) = spec.file_location {
                script_args.push(format!("location={}", location.code()));
            }
            shipped_files.push(card.clone());
        }
        None if spec.file_location.is_some() => {
            warn!(job = %spec.job_tag, "file location ignored for a job without a card");
        }
        None => {}
    }

    let descriptor = JobDescriptor {
        general: GeneralSection {
            request_name: spec.job_tag.clone(),
            work_area: spec.job_tag.clone(),
            transfer_logs: spec.transfer_logs,
        },
        job_type: JobTypeSection {
            plugin_name: PLUGIN_NAME.to_string(),
            pset_name: PSET_NAME.to_string(),
            script_exe: SCRIPT_EXE.to_string(),
            script_args,
            input_files: shipped_files,
            output_files: vec![output_file],
            max_job_runtime_min: spec.max_runtime_min,
            max_memory_mb: spec.max_memory_mb,
        },
        data: DataSection {
            user_input_files: input_files.to_vec(),
            splitting: SPLITTING.to_string(),
            units_per_job: spec.units_per_job,
            total_units: input_files.len() as u64,
            output_primary_dataset: spec.primary_dataset.clone(),
            out_lfn_dir_base: format!("/store/user/{}/{}", spec.lfn_user, spec.job_tag),
            publication: spec.publication,
        },
        site: SiteSection {
            whitelist: spec.whitelist.clone(),
            storage_site: spec.storage_site.clone(),
        },
        debug: spec.force_whitelist.then(|| DebugSection {
            extra_jdl: vec![NO_OVERFLOW.to_string()],
        }),
    };
    debug!(
        job = %spec.job_tag,
        files = descriptor.data.total_units,
        "assembled job descriptor"
    );
    Ok(descriptor)
}

/// Reads an input list: one file per line, surrounding whitespace removed,
/// blank lines skipped.
pub fn load_input_list(path: &Path) -> Result<Vec<String>, DjError> {
    let raw =
        fs::read_to_string(path).map_err(|err| DjError::io("dj_crab.input_list", path, err))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
