#![deny(missing_docs)]

//! Grid job descriptors for the dijet analysis productions.
//!
//! A [`JobSpec`] holds the literals of one production. [`assemble`] turns it
//! and the list of input files into an immutable [`JobDescriptor`], which
//! renders either as a CRAB Python configuration or as canonical JSON.

/// Descriptor sections and assembly.
pub mod descriptor;
/// Python and JSON renderers.
pub mod render;
/// Job file literals.
pub mod spec;

pub use descriptor::{
    assemble, load_input_list, ConfigValue, DataSection, DebugSection, GeneralSection,
    JobDescriptor, JobTypeSection, SiteSection,
};
pub use render::{python_literal, render_json, render_python};
pub use spec::{FileLocation, JobSpec};
