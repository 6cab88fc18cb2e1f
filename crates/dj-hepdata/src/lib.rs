#![deny(missing_docs)]

//! HepData object model, declarative maker plans and the submission emitter.

/// YAML rendering and the on-disk submission layout.
pub mod emit;
/// Submission, table and variable types.
pub mod model;
/// Maker plans and the submission builder.
pub mod plan;

pub use emit::{
    create_files, render_index, render_table, EmitOptions, EmitReport, EmittedFile, ARCHIVE_FILE,
    SUBMISSION_FILE,
};
pub use model::{
    KeywordValue, Link, Qualifier, RecordId, Submission, Table, Uncertainty, UncertaintyValues,
    Variable, VariableValues,
};
pub use plan::{
    build_submission, AxisSpec, GroupSpec, LinkSpec, MakerPlan, RecordIdSpec, SeriesSpec,
    SourceKind, SourceSpec, SystMode, TableSpec,
};
