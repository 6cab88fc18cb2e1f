//! Writes a [`Submission`] to disk in the HepData YAML layout.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use dj_core::errors::{DjError, ErrorInfo};
use dj_core::sha256_hex;
use serde::Serialize;
use tracing::info;
use zip::write::FileOptions;

use crate::model::{
    KeywordValue, Link, RecordId, Submission, Table, UncertaintyValues, Variable, VariableValues,
};

/// Name of the index file HepData looks for.
pub const SUBMISSION_FILE: &str = "submission.yaml";
/// Name of the upload archive.
pub const ARCHIVE_FILE: &str = "submission.zip";

/// Controls what [`create_files`] writes besides the YAML files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Also bundle the written files into [`ARCHIVE_FILE`].
    pub archive: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { archive: true }
    }
}

/// One written file and its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedFile {
    /// Path relative to the output directory.
    pub path: String,
    /// SHA-256 of the file contents, lowercase hex.
    pub sha256: String,
}

/// Files written by [`create_files`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitReport {
    /// Directory everything was written to.
    pub out_dir: PathBuf,
    /// `submission.yaml` followed by the table data files.
    pub files: Vec<EmittedFile>,
    /// Upload archive, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

fn is_empty_str(text: &&str) -> bool {
    text.is_empty()
}

#[derive(Serialize)]
struct HeaderDoc<'a> {
    comment: &'a str,
    #[serde(skip_serializing_if = "is_empty_slice")]
    additional_resources: &'a [Link],
    #[serde(skip_serializing_if = "is_empty_slice")]
    record_ids: &'a [RecordId],
}

#[derive(Serialize)]
struct KeywordDoc<'a> {
    name: &'a str,
    values: &'a [KeywordValue],
}

#[derive(Serialize)]
struct TableIndexDoc<'a> {
    name: &'a str,
    description: &'a str,
    location: &'a str,
    keywords: Vec<KeywordDoc<'a>>,
    data_file: String,
}

#[derive(Serialize)]
struct VariableHeader<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "is_empty_str")]
    units: &'a str,
}

#[derive(Serialize)]
struct QualifierDoc<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct AsymErrorDoc {
    minus: f64,
    plus: f64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorDoc<'a> {
    Symmetric { symerror: f64, label: &'a str },
    Asymmetric { asymerror: AsymErrorDoc, label: &'a str },
}

#[derive(Serialize)]
#[serde(untagged)]
enum ValueDoc<'a> {
    Bin {
        low: f64,
        high: f64,
    },
    Point {
        value: f64,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        errors: Vec<ErrorDoc<'a>>,
    },
}

#[derive(Serialize)]
struct VariableDoc<'a> {
    header: VariableHeader<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    qualifiers: Vec<QualifierDoc<'a>>,
    values: Vec<ValueDoc<'a>>,
}

#[derive(Serialize)]
struct DataFileDoc<'a> {
    independent_variables: Vec<VariableDoc<'a>>,
    dependent_variables: Vec<VariableDoc<'a>>,
}

fn yaml_error(err: serde_yaml::Error) -> DjError {
    DjError::Serde(ErrorInfo::new("dj_hepdata.yaml", err.to_string()))
}

fn variable_doc(variable: &Variable) -> VariableDoc<'_> {
    let values = match &variable.values {
        VariableValues::Binned(bins) => bins
            .iter()
            .map(|(low, high)| ValueDoc::Bin {
                low: *low,
                high: *high,
            })
            .collect(),
        VariableValues::Points(points) => points
            .iter()
            .enumerate()
            .map(|(idx, value)| ValueDoc::Point {
                value: *value,
                errors: variable
                    .uncertainties
                    .iter()
                    .map(|unc| match &unc.values {
                        UncertaintyValues::Symmetric(values) => ErrorDoc::Symmetric {
                            symerror: values[idx],
                            label: &unc.label,
                        },
                        UncertaintyValues::Asymmetric(values) => ErrorDoc::Asymmetric {
                            asymerror: AsymErrorDoc {
                                minus: values[idx].0,
                                plus: values[idx].1,
                            },
                            label: &unc.label,
                        },
                    })
                    .collect(),
            })
            .collect(),
    };
    VariableDoc {
        header: VariableHeader {
            name: &variable.name,
            units: &variable.units,
        },
        qualifiers: variable
            .qualifiers
            .iter()
            .map(|q| QualifierDoc {
                name: &q.name,
                value: &q.value,
            })
            .collect(),
        values,
    }
}

/// Validates one table and renders its data file.
pub fn render_table(table: &Table) -> Result<String, DjError> {
    table.validate()?;
    let doc = DataFileDoc {
        independent_variables: table.independent_variables().map(variable_doc).collect(),
        dependent_variables: table.dependent_variables().map(variable_doc).collect(),
    };
    serde_yaml::to_string(&doc).map_err(yaml_error)
}

/// Renders `submission.yaml`: a header document followed by one document per table.
pub fn render_index(submission: &Submission) -> Result<String, DjError> {
    let mut docs = Vec::with_capacity(submission.tables.len() + 1);
    docs.push(
        serde_yaml::to_string(&HeaderDoc {
            comment: &submission.comment,
            additional_resources: &submission.links,
            record_ids: &submission.record_ids,
        })
        .map_err(yaml_error)?,
    );
    for table in &submission.tables {
        let doc = TableIndexDoc {
            name: &table.name,
            description: &table.description,
            location: &table.location,
            keywords: table
                .keywords
                .iter()
                .map(|(name, values)| KeywordDoc { name, values })
                .collect(),
            data_file: table.data_file_name(),
        };
        docs.push(serde_yaml::to_string(&doc).map_err(yaml_error)?);
    }
    Ok(docs.join("---\n"))
}

/// Validates the submission and writes it to `out_dir`.
///
/// Nothing is written when validation fails.
pub fn create_files(
    submission: &Submission,
    out_dir: &Path,
    opts: &EmitOptions,
) -> Result<EmitReport, DjError> {
    submission.validate()?;

    let mut rendered = Vec::with_capacity(submission.tables.len() + 1);
    rendered.push((SUBMISSION_FILE.to_string(), render_index(submission)?));
    for table in &submission.tables {
        rendered.push((table.data_file_name(), render_table(table)?));
    }

    fs::create_dir_all(out_dir).map_err(|err| DjError::io("dj_hepdata.out_dir", out_dir, err))?;
    let mut files = Vec::with_capacity(rendered.len());
    for (name, contents) in &rendered {
        let path = out_dir.join(name);
        fs::write(&path, contents).map_err(|err| DjError::io("dj_hepdata.write", &path, err))?;
        files.push(EmittedFile {
            path: name.clone(),
            sha256: sha256_hex(contents.as_bytes()),
        });
    }

    let archive = if opts.archive {
        let path = out_dir.join(ARCHIVE_FILE);
        write_archive(&path, &rendered)?;
        Some(path)
    } else {
        None
    };

    info!(
        out_dir = %out_dir.display(),
        tables = submission.tables.len(),
        archived = archive.is_some(),
        "wrote hepdata submission"
    );
    Ok(EmitReport {
        out_dir: out_dir.to_path_buf(),
        files,
        archive,
    })
}

fn write_archive(path: &Path, entries: &[(String, String)]) -> Result<(), DjError> {
    let zip_error = |err: zip::result::ZipError| DjError::io("dj_hepdata.archive", path, err);
    let file = File::create(path).map_err(|err| DjError::io("dj_hepdata.archive", path, err))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, contents) in entries {
        writer.start_file(name.as_str(), options).map_err(zip_error)?;
        writer
            .write_all(contents.as_bytes())
            .map_err(|err| DjError::io("dj_hepdata.archive", path, err))?;
    }
    writer.finish().map_err(zip_error)?;
    Ok(())
}
