//! Provenance descriptors written next to generated release artefacts.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Records which inputs produced a generated artefact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReleaseProvenance {
    /// Schema of this provenance record.
    pub schema_version: SchemaVersion,
    /// Stable hash of the configuration (job file or maker plan) that was used.
    pub config_hash: String,
    /// SHA-256 digests of every input file, keyed by the path as written in the configuration.
    pub input_hashes: BTreeMap<String, String>,
    /// ISO-8601 timestamp recording when the artefact was generated.
    pub created_at: String,
    /// Version map for the tools involved.
    pub tool_versions: BTreeMap<String, String>,
}

impl ReleaseProvenance {
    /// Starts a record stamped with the current UTC time.
    pub fn now(config_hash: impl Into<String>) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            config_hash: config_hash.into(),
            input_hashes: BTreeMap::new(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_versions: BTreeMap::new(),
        }
    }

    /// Records the digest of one input file.
    pub fn with_input(mut self, path: impl Into<String>, sha256: impl Into<String>) -> Self {
        self.input_hashes.insert(path.into(), sha256.into());
        self
    }

    /// Records a tool version.
    pub fn with_tool(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.tool_versions.insert(name.into(), version.into());
        self
    }
}
