use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use dj_core::stable_hash_string;
use dj_crab::{assemble, load_input_list, render_json, render_python, JobSpec};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Python,
    Json,
    Both,
}

#[derive(Args, Debug)]
pub struct CrabArgs {
    /// YAML job file describing the production.
    #[arg(long)]
    pub job: PathBuf,
    /// Input list overriding the one named in the job file.
    #[arg(long)]
    pub input_list: Option<PathBuf>,
    /// Directory receiving the rendered configuration.
    #[arg(long)]
    pub out: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Python)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct CrabSummary {
    request_name: String,
    total_units: u64,
    descriptor_hash: String,
    files: Vec<String>,
}

pub fn run(args: &CrabArgs) -> Result<(), Box<dyn Error>> {
    let (spec, base) = JobSpec::load(&args.job)?;
    let list = args
        .input_list
        .clone()
        .unwrap_or_else(|| base.join(&spec.input_list));
    let inputs = load_input_list(&list)?;
    let descriptor = assemble(&spec, &inputs)?;

    fs::create_dir_all(&args.out)?;
    let mut files = Vec::new();
    if matches!(args.format, OutputFormat::Python | OutputFormat::Both) {
        let path = args.out.join(format!("crab_{}.py", spec.job_tag));
        fs::write(&path, render_python(&descriptor))?;
        files.push(path.display().to_string());
    }
    if matches!(args.format, OutputFormat::Json | OutputFormat::Both) {
        let path = args.out.join(format!("crab_{}.json", spec.job_tag));
        let mut text = render_json(&descriptor)?;
        text.push('\n');
        fs::write(&path, text)?;
        files.push(path.display().to_string());
    }
    info!(job = %spec.job_tag, files = files.len(), "rendered crab configuration");

    super::print_json(&CrabSummary {
        request_name: descriptor.general.request_name.clone(),
        total_units: descriptor.data.total_units,
        descriptor_hash: stable_hash_string(&descriptor)?,
        files,
    })
}
