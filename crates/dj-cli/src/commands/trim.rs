use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use dj_core::{DjError, ErrorInfo};
use dj_hist::{trim, BinnedSeries, ObjectKind, ResultFile, TrimCuts, TrimReport};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Result file (JSON or YAML dump).
    #[arg(long)]
    pub input: PathBuf,
    /// Histogram or graph to trim.
    #[arg(long)]
    pub name: String,
    /// Drop trailing bins whose upper edge exceeds this value.
    #[arg(long)]
    pub max_edge: Option<f64>,
    /// Drop leading bins whose upper edge is below this value.
    #[arg(long)]
    pub min_edge: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TrimOutput {
    object: String,
    report: TrimReport,
    series: BinnedSeries,
}

pub fn run(args: &TrimArgs) -> Result<(), Box<dyn Error>> {
    let file = ResultFile::open(&args.input)?;
    let mut series = match file.kind_of(&args.name)? {
        ObjectKind::Hist1d => {
            let hist = file.read_hist_1d(&args.name)?;
            hist.to_series(&vec![0.0; hist.len()])?
        }
        ObjectKind::Graph => {
            let graph = file.read_graph(&args.name)?;
            graph.to_series(&vec![0.0; graph.len()])?
        }
        ObjectKind::Hist2d => {
            return Err(DjError::Hist(
                ErrorInfo::new(
                    "dj_cli.trim_kind",
                    format!("`{}` is a 2D histogram and has no single bin axis", args.name),
                )
                .with_context("object", args.name.clone()),
            )
            .into())
        }
    };
    let cuts = TrimCuts {
        max_upper_edge: args.max_edge,
        min_upper_edge: args.min_edge,
    };
    let report = trim(&mut series, &cuts)?;
    super::print_json(&TrimOutput {
        object: args.name.clone(),
        report,
        series,
    })
}
