#![deny(missing_docs)]

//! Histogram and graph extraction, bin trimming and slicing for dijet results.

/// Result file reader.
pub mod reader;
/// Histogram, graph and series records.
pub mod records;
/// Grouping of flat object lists.
pub mod slice;
/// Bin-range trimming.
pub mod trim;

pub use reader::{ObjectKind, ResultFile, StoredObject};
pub use records::{BinEdges, BinnedSeries, Graph, Hist1D, Hist2D};
pub use slice::{broadcast_first, select_group};
pub use trim::{
    check_monotonic, over_range_count, retained_range, trim, trim_edges, under_range_count,
    TrimCuts, TrimReport,
};
