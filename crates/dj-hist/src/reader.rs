//! Reader for analysis output files.
//!
//! The analysis stores its final histograms and graphs in ROOT files; the
//! release tools consume a JSON or YAML dump of those objects keyed by the
//! object name used in the analysis:
//!
//! ```yaml
//! objects:
//!   py_deta_all_0:
//!     kind: hist1d
//!     x_edges: [[0.0, 0.2], [0.2, 0.4]]
//!     y: [1.0, 2.0]
//!     dy: [0.1, 0.1]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dj_core::errors::{DjError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::{Graph, Hist1D, Hist2D};

/// One named object stored in a result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoredObject {
    /// One-dimensional histogram.
    Hist1d(Hist1D),
    /// Two-dimensional histogram.
    Hist2d(Hist2D),
    /// Graph with symmetric errors.
    Graph(Graph),
}

impl StoredObject {
    /// Kind tag of the object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            StoredObject::Hist1d(_) => ObjectKind::Hist1d,
            StoredObject::Hist2d(_) => ObjectKind::Hist2d,
            StoredObject::Graph(_) => ObjectKind::Graph,
        }
    }
}

/// Discriminant of [`StoredObject`], used when a caller asks for a specific kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// See [`StoredObject::Hist1d`].
    Hist1d,
    /// See [`StoredObject::Hist2d`].
    Hist2d,
    /// See [`StoredObject::Graph`].
    Graph,
}

impl ObjectKind {
    /// Name used for the kind in result files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Hist1d => "hist1d",
            ObjectKind::Hist2d => "hist2d",
            ObjectKind::Graph => "graph",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResultDocument {
    #[serde(default)]
    objects: BTreeMap<String, StoredObject>,
}

/// Read-only view over the objects of one analysis output file.
#[derive(Debug, Clone)]
pub struct ResultFile {
    path: PathBuf,
    objects: BTreeMap<String, StoredObject>,
}

impl ResultFile {
    /// Opens a result dump. Files ending in `.yaml`/`.yml` are parsed as YAML,
    /// everything else as JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DjError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| DjError::io("dj_hist.open", path, err))?;
        let document: ResultDocument = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw).map_err(|err| {
                DjError::Serde(ErrorInfo::new("dj_hist.parse_yaml", err.to_string()).with_path(path))
            })?,
            _ => serde_json::from_str(&raw).map_err(|err| {
                DjError::Serde(ErrorInfo::new("dj_hist.parse_json", err.to_string()).with_path(path))
            })?,
        };
        debug!(path = %path.display(), objects = document.objects.len(), "opened result file");
        Ok(Self {
            path: path.to_path_buf(),
            objects: document.objects,
        })
    }

    /// Builds a result file from in-memory objects.
    pub fn from_objects(
        path: impl Into<PathBuf>,
        objects: impl IntoIterator<Item = (String, StoredObject)>,
    ) -> Self {
        Self {
            path: path.into(),
            objects: objects.into_iter().collect(),
        }
    }

    /// Path the objects were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Object names with their kinds, in name order.
    pub fn listing(&self) -> Vec<(&str, ObjectKind)> {
        self.objects
            .iter()
            .map(|(name, object)| (name.as_str(), object.kind()))
            .collect()
    }

    /// Kind of the named object.
    pub fn kind_of(&self, name: &str) -> Result<ObjectKind, DjError> {
        self.lookup(name).map(StoredObject::kind)
    }

    /// Reads and validates a one-dimensional histogram.
    pub fn read_hist_1d(&self, name: &str) -> Result<Hist1D, DjError> {
        match self.lookup(name)? {
            StoredObject::Hist1d(hist) => {
                hist.validate().map_err(|err| self.annotate(err, name))?;
                Ok(hist.clone())
            }
            other => Err(self.wrong_kind(name, ObjectKind::Hist1d, other.kind())),
        }
    }

    /// Reads and validates a two-dimensional histogram.
    pub fn read_hist_2d(&self, name: &str) -> Result<Hist2D, DjError> {
        match self.lookup(name)? {
            StoredObject::Hist2d(hist) => {
                hist.validate().map_err(|err| self.annotate(err, name))?;
                Ok(hist.clone())
            }
            other => Err(self.wrong_kind(name, ObjectKind::Hist2d, other.kind())),
        }
    }

    /// Reads and validates a graph.
    pub fn read_graph(&self, name: &str) -> Result<Graph, DjError> {
        match self.lookup(name)? {
            StoredObject::Graph(graph) => {
                graph.validate().map_err(|err| self.annotate(err, name))?;
                Ok(graph.clone())
            }
            other => Err(self.wrong_kind(name, ObjectKind::Graph, other.kind())),
        }
    }

    fn lookup(&self, name: &str) -> Result<&StoredObject, DjError> {
        self.objects.get(name).ok_or_else(|| {
            DjError::Hist(
                ErrorInfo::new(
                    "dj_hist.missing_object",
                    format!("object `{name}` not found"),
                )
                .with_context("object", name)
                .with_path(&self.path),
            )
        })
    }

    fn wrong_kind(&self, name: &str, expected: ObjectKind, found: ObjectKind) -> DjError {
        DjError::Hist(
            ErrorInfo::new(
                "dj_hist.wrong_kind",
                format!(
                    "object `{name}` is a {}, expected a {}",
                    found.as_str(),
                    expected.as_str()
                ),
            )
            .with_context("object", name)
            .with_path(&self.path),
        )
    }

    fn annotate(&self, err: DjError, name: &str) -> DjError {
        match err {
            DjError::Hist(info) => DjError::Hist(info.with_context("object", name).with_path(&self.path)),
            other => other,
        }
    }
}
