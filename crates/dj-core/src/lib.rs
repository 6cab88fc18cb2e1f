#![deny(missing_docs)]
#![doc = "Shared error surface, canonical serialization and provenance records for the dijet release tools."]

pub mod errors;
pub mod provenance;
pub mod serde;

pub use errors::{DjError, ErrorInfo};
pub use provenance::{ReleaseProvenance, SchemaVersion};
pub use crate::serde::{
    from_json_slice, sha256_hex, stable_hash_string, to_canonical_json_bytes,
    to_canonical_json_pretty,
};
