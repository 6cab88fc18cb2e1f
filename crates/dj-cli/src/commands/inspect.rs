use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use dj_hist::{ObjectKind, ResultFile};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Result file (JSON or YAML dump).
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
struct Entry<'a> {
    name: &'a str,
    kind: ObjectKind,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    path: String,
    objects: Vec<Entry<'a>>,
}

pub fn run(args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let file = ResultFile::open(&args.input)?;
    let objects = file
        .listing()
        .into_iter()
        .map(|(name, kind)| Entry { name, kind })
        .collect();
    super::print_json(&Listing {
        path: file.path().display().to_string(),
        objects,
    })
}
