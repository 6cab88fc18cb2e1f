pub mod crab;
pub mod hepdata;
pub mod inspect;
pub mod trim;
pub mod version;

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Serialize;

/// Prints a payload as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", dj_core::to_canonical_json_pretty(value)?);
    Ok(())
}

/// Writes a payload as pretty canonical JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let mut text = dj_core::to_canonical_json_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
