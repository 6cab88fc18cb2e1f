use std::error::Error;
use std::process::Command;

use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also print the git commit and compiler version.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    git_commit: String,
    rustc: String,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    super::print_json(&VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        git_commit: probe("git", &["rev-parse", "HEAD"]).unwrap_or_else(|| "unknown".into()),
        rustc: probe("rustc", &["--version"]).unwrap_or_else(|| "rustc unavailable".into()),
    })
}

fn probe(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}
