use std::fs;
use std::path::{Path, PathBuf};

use dj_core::errors::{DjError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Where the job script looks for its input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileLocation {
    /// Purdue storage.
    Purdue,
    /// CERN EOS.
    Cern,
    /// Let xrootd find the closest replica.
    Xrootd,
}

impl FileLocation {
    /// Numeric code understood by the job script.
    pub fn code(self) -> u8 {
        match self {
            FileLocation::Purdue => 0,
            FileLocation::Cern => 1,
            FileLocation::Xrootd => 2,
        }
    }
}

/// Literals describing one grid production, read from a job YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Analysis card shipped with the job and passed to the script. Without
    /// one the script runs with no arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    /// Request name; also used for the work area and output directory.
    pub job_tag: String,
    /// Output file name; defaults to `<job_tag>.root`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Text file listing one input file per line.
    pub input_list: PathBuf,
    /// Passed to the script as `location=<code>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_location: Option<FileLocation>,
    /// Code tarball unpacked by the job script.
    #[serde(default = "default_tarball")]
    pub tarball: String,
    /// Wall-clock limit per job, in minutes.
    #[serde(default = "default_max_runtime_min")]
    pub max_runtime_min: u64,
    /// Memory limit per job, in MB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_mb: Option<u64>,
    /// Input files per job.
    #[serde(default = "default_units_per_job")]
    pub units_per_job: u64,
    /// Dataset name of the output.
    pub primary_dataset: String,
    /// Grid user owning the output area under `/store/user`.
    pub lfn_user: String,
    /// Sites allowed to run the jobs.
    pub whitelist: Vec<String>,
    /// Site receiving the output.
    #[serde(default = "default_storage_site")]
    pub storage_site: String,
    /// Copy job logs to the storage site.
    #[serde(default)]
    pub transfer_logs: bool,
    /// Forbid overflow to sites outside the whitelist.
    #[serde(default = "default_force_whitelist")]
    pub force_whitelist: bool,
    /// Publish the output dataset.
    #[serde(default)]
    pub publication: bool,
}

fn default_tarball() -> String {
    "dijet5TeV.tar.gz".to_string()
}

fn default_max_runtime_min() -> u64 {
    800
}

fn default_units_per_job() -> u64 {
    1
}

fn default_storage_site() -> String {
    "T3_US_FNALLPC".to_string()
}

fn default_force_whitelist() -> bool {
    true
}

impl JobSpec {
    /// Reads a job file. Returns the job and the directory its relative paths are resolved against.
    pub fn load(path: &Path) -> Result<(Self, PathBuf), DjError> {
        let raw =
            fs::read_to_string(path).map_err(|err| DjError::io("dj_crab.job_read", path, err))?;
        let spec: JobSpec = serde_yaml::from_str(&raw).map_err(|err| {
            DjError::Serde(ErrorInfo::new("dj_crab.job_parse", err.to_string()).with_path(path))
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok((spec, base))
    }

    /// Output file name, `<job_tag>.root` unless set.
    pub fn output_file(&self) -> String {
        self.output_file
            .clone()
            .unwrap_or_else(|| format!("{}.root", self.job_tag))
    }
}
