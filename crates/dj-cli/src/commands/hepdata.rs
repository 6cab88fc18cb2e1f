use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use dj_core::{sha256_hex, stable_hash_string, DjError, ErrorInfo, ReleaseProvenance};
use dj_hepdata::{build_submission, create_files, EmitOptions, MakerPlan};
use tracing::info;

/// File written next to the submission recording what produced it.
pub const PROVENANCE_FILE: &str = "provenance.json";

#[derive(Args, Debug)]
pub struct HepdataArgs {
    /// YAML maker plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Output directory; defaults to the plan's `output_directory`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Skip writing submission.zip.
    #[arg(long)]
    pub no_archive: bool,
}

pub fn run(args: &HepdataArgs) -> Result<(), Box<dyn Error>> {
    let (plan, base) = MakerPlan::load(&args.plan)?;
    let out = match (&args.out, &plan.output_directory) {
        (Some(out), _) => out.clone(),
        (None, Some(dir)) => base.join(dir),
        (None, None) => {
            return Err(DjError::Table(
                ErrorInfo::new("dj_cli.no_output", "no output directory given")
                    .with_path(&args.plan)
                    .with_hint("pass --out or set output_directory in the plan"),
            )
            .into())
        }
    };

    let submission = build_submission(&plan, &base)?;
    let mut provenance = ReleaseProvenance::now(stable_hash_string(&plan)?)
        .with_tool("dj-release", env!("CARGO_PKG_VERSION"));
    for input in plan.input_files(&base) {
        let bytes =
            fs::read(&input).map_err(|err| DjError::io("dj_cli.hash_input", &input, err))?;
        provenance = provenance.with_input(input.display().to_string(), sha256_hex(&bytes));
    }

    let report = create_files(
        &submission,
        &out,
        &EmitOptions {
            archive: !args.no_archive,
        },
    )?;
    super::write_json(&out.join(PROVENANCE_FILE), &provenance)?;
    info!(out = %out.display(), tables = submission.tables.len(), "hepdata release written");

    super::print_json(&report)
}
