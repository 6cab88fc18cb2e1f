use dj_core::errors::{DjError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Lower and upper edge of one bin.
pub type BinEdges = (f64, f64);

/// One-dimensional histogram as stored in an analysis output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// Bin edges along x, in bin order.
    pub x_edges: Vec<BinEdges>,
    /// Bin contents.
    pub y: Vec<f64>,
    /// Statistical error of each bin content.
    pub dy: Vec<f64>,
}

/// Two-dimensional histogram. `z[ix][iy]` holds the content of bin
/// (`x_edges[ix]`, `y_edges[iy]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist2D {
    /// Bin edges along x.
    pub x_edges: Vec<BinEdges>,
    /// Bin edges along y.
    pub y_edges: Vec<BinEdges>,
    /// Bin contents, one row per x bin.
    pub z: Vec<Vec<f64>>,
    /// Errors laid out like `z`.
    pub dz: Vec<Vec<f64>>,
}

/// Graph with symmetric errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Point positions.
    pub x: Vec<f64>,
    /// Half widths of the points; empty for graphs without x errors.
    #[serde(default)]
    pub dx: Vec<f64>,
    /// Point values.
    pub y: Vec<f64>,
    /// Errors of the point values.
    pub dy: Vec<f64>,
}

/// Parallel sequences describing the bins of one published data series.
///
/// Every sequence has the same length; index `i` in each of them describes
/// bin `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedSeries {
    /// Bin edges.
    pub edges: Vec<BinEdges>,
    /// Central values.
    pub values: Vec<f64>,
    /// Statistical uncertainties.
    pub stat: Vec<f64>,
    /// Systematic uncertainties.
    pub syst: Vec<f64>,
}

fn length_error(object: &str, field: &str, expected: usize, found: usize) -> DjError {
    DjError::Hist(
        ErrorInfo::new(
            "dj_hist.length_mismatch",
            format!("{object}: `{field}` has {found} entries, expected {expected}"),
        )
        .with_context("field", field)
        .with_context("expected", expected.to_string())
        .with_context("found", found.to_string()),
    )
}

impl Hist1D {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.x_edges.len()
    }

    /// True when the histogram has no bins.
    pub fn is_empty(&self) -> bool {
        self.x_edges.is_empty()
    }

    /// Checks that contents and errors match the number of bins.
    pub fn validate(&self) -> Result<(), DjError> {
        let n = self.x_edges.len();
        if self.y.len() != n {
            return Err(length_error("hist1d", "y", n, self.y.len()));
        }
        if self.dy.len() != n {
            return Err(length_error("hist1d", "dy", n, self.dy.len()));
        }
        Ok(())
    }

    /// Pairs this histogram's values and statistical errors with systematic
    /// errors taken from a companion histogram.
    pub fn to_series(&self, syst: &[f64]) -> Result<BinnedSeries, DjError> {
        self.validate()?;
        if syst.len() != self.len() {
            return Err(length_error("hist1d", "syst", self.len(), syst.len()));
        }
        Ok(BinnedSeries {
            edges: self.x_edges.clone(),
            values: self.y.clone(),
            stat: self.dy.clone(),
            syst: syst.to_vec(),
        })
    }
}

impl Hist2D {
    /// Checks that every row of `z` and `dz` matches the binning.
    pub fn validate(&self) -> Result<(), DjError> {
        let nx = self.x_edges.len();
        let ny = self.y_edges.len();
        if self.z.len() != nx {
            return Err(length_error("hist2d", "z", nx, self.z.len()));
        }
        if self.dz.len() != nx {
            return Err(length_error("hist2d", "dz", nx, self.dz.len()));
        }
        for (row, errors) in self.z.iter().zip(&self.dz) {
            if row.len() != ny {
                return Err(length_error("hist2d", "z[row]", ny, row.len()));
            }
            if errors.len() != ny {
                return Err(length_error("hist2d", "dz[row]", ny, errors.len()));
            }
        }
        Ok(())
    }

    /// Flattens the histogram in row-major order into (x bin, y bin, value, error) tuples.
    pub fn flatten(&self) -> Vec<(BinEdges, BinEdges, f64, f64)> {
        let mut cells = Vec::with_capacity(self.x_edges.len() * self.y_edges.len());
        for (ix, x_bin) in self.x_edges.iter().enumerate() {
            for (iy, y_bin) in self.y_edges.iter().enumerate() {
                cells.push((*x_bin, *y_bin, self.z[ix][iy], self.dz[ix][iy]));
            }
        }
        cells
    }
}

impl Graph {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True when the graph has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Checks that every per-point sequence has one entry per point.
    pub fn validate(&self) -> Result<(), DjError> {
        let n = self.x.len();
        if !self.dx.is_empty() && self.dx.len() != n {
            return Err(length_error("graph", "dx", n, self.dx.len()));
        }
        if self.y.len() != n {
            return Err(length_error("graph", "y", n, self.y.len()));
        }
        if self.dy.len() != n {
            return Err(length_error("graph", "dy", n, self.dy.len()));
        }
        Ok(())
    }

    /// Point extents `(x - dx, x + dx)`; points without `dx` collapse to `(x, x)`.
    pub fn edges(&self) -> Vec<BinEdges> {
        self.x
            .iter()
            .enumerate()
            .map(|(idx, x)| {
                let half = self.dx.get(idx).copied().unwrap_or(0.0);
                (x - half, x + half)
            })
            .collect()
    }

    /// Series over the point extents of [`Graph::edges`].
    ///
    /// Extents may overlap when `dx` varies; trimming orders them by centre.
    pub fn to_series(&self, syst: &[f64]) -> Result<BinnedSeries, DjError> {
        self.validate()?;
        if syst.len() != self.len() {
            return Err(length_error("graph", "syst", self.len(), syst.len()));
        }
        Ok(BinnedSeries {
            edges: self.edges(),
            values: self.y.clone(),
            stat: self.dy.clone(),
            syst: syst.to_vec(),
        })
    }
}

impl BinnedSeries {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True when the series has no bins.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Checks that the four sequences have equal length.
    pub fn validate(&self) -> Result<(), DjError> {
        let n = self.edges.len();
        for (field, len) in [
            ("values", self.values.len()),
            ("stat", self.stat.len()),
            ("syst", self.syst.len()),
        ] {
            if len != n {
                return Err(length_error("series", field, n, len));
            }
        }
        Ok(())
    }
}
