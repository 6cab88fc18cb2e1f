//! Bin-range trimming.
//!
//! Drops the bins of a [`BinnedSeries`] that fall outside the declared
//! analysis range. Bins are classified by their upper edge only: a trailing
//! bin is over range when its upper edge exceeds the upper cut, a leading bin
//! is under range when its upper edge is below the lower cut. Both counts are
//! taken on the untrimmed series so combining cuts never double counts.

use std::ops::Range;

use dj_core::errors::{DjError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::{BinEdges, BinnedSeries};

/// Analysis range applied to a series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrimCuts {
    /// Bins whose upper edge exceeds this value are removed from the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upper_edge: Option<f64>,
    /// Bins whose upper edge is below this value are removed from the start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_upper_edge: Option<f64>,
}

impl TrimCuts {
    /// Upper cut only.
    pub fn upper(cut: f64) -> Self {
        Self {
            max_upper_edge: Some(cut),
            min_upper_edge: None,
        }
    }

    /// Both cuts.
    pub fn range(min_upper_edge: f64, max_upper_edge: f64) -> Self {
        Self {
            max_upper_edge: Some(max_upper_edge),
            min_upper_edge: Some(min_upper_edge),
        }
    }

    /// True when neither cut is set.
    pub fn is_noop(&self) -> bool {
        self.max_upper_edge.is_none() && self.min_upper_edge.is_none()
    }
}

/// Outcome of a trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimReport {
    /// Leading bins removed.
    pub under: usize,
    /// Trailing bins removed.
    pub over: usize,
    /// Bins left in every sequence.
    pub retained: usize,
}

/// Number of trailing bins whose upper edge exceeds `cut`.
pub fn over_range_count(edges: &[BinEdges], cut: f64) -> usize {
    edges.iter().rev().take_while(|(_, hi)| *hi > cut).count()
}

/// Number of leading bins whose upper edge is below `cut`.
pub fn under_range_count(edges: &[BinEdges], cut: f64) -> usize {
    edges.iter().take_while(|(_, hi)| *hi < cut).count()
}

/// Checks that every bin has `lo <= hi` and that bin centres never decrease
/// from one bin to the next.
///
/// Graph extents `x ± dx` may overlap and need not have sorted edges when
/// `dx` varies, so only the centres are required to be ordered.
pub fn check_monotonic(edges: &[BinEdges]) -> Result<(), DjError> {
    for (idx, (lo, hi)) in edges.iter().enumerate() {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(DjError::Hist(
                ErrorInfo::new(
                    "dj_hist.inverted_bin",
                    format!("bin {idx} has edges ({lo}, {hi})"),
                )
                .with_context("bin", idx.to_string()),
            ));
        }
    }
    for (idx, pair) in edges.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        if next.0 + next.1 < prev.0 + prev.1 {
            return Err(DjError::Hist(
                ErrorInfo::new(
                    "dj_hist.non_monotonic",
                    format!("bin {} {:?} precedes bin {} {:?}", idx, prev, idx + 1, next),
                )
                .with_context("bin", (idx + 1).to_string())
                .with_hint("bins must be sorted by increasing centre"),
            ));
        }
    }
    Ok(())
}

/// Computes which bins of `edges` survive `cuts`.
///
/// Fails when the edges are not monotonic or the cuts would leave no bin.
pub fn retained_range(
    edges: &[BinEdges],
    cuts: &TrimCuts,
) -> Result<(Range<usize>, TrimReport), DjError> {
    check_monotonic(edges)?;

    let total = edges.len();
    let under = cuts
        .min_upper_edge
        .map(|cut| under_range_count(edges, cut))
        .unwrap_or(0);
    let over = cuts
        .max_upper_edge
        .map(|cut| over_range_count(edges, cut))
        .unwrap_or(0);

    if under + over >= total {
        return Err(DjError::Hist(
            ErrorInfo::new(
                "dj_hist.empty_after_trim",
                format!("cuts remove {under} leading and {over} trailing bins out of {total}"),
            )
            .with_context("under", under.to_string())
            .with_context("over", over.to_string())
            .with_context("bins", total.to_string())
            .with_hint("check that the analysis range overlaps the histogram"),
        ));
    }

    let report = TrimReport {
        under,
        over,
        retained: total - under - over,
    };
    Ok((under..total - over, report))
}

/// Trims a bare list of bin edges, e.g. an explicit x axis.
pub fn trim_edges(edges: &mut Vec<BinEdges>, cuts: &TrimCuts) -> Result<TrimReport, DjError> {
    let (keep, report) = retained_range(edges, cuts)?;
    *edges = edges[keep].to_vec();
    Ok(report)
}

/// Removes out-of-range bins from every parallel sequence of `series`.
///
/// Fails without touching the series when the sequences differ in length,
/// the edges are not monotonic, or the cuts would leave no bin.
pub fn trim(series: &mut BinnedSeries, cuts: &TrimCuts) -> Result<TrimReport, DjError> {
    series.validate()?;
    let (keep, report) = retained_range(&series.edges, cuts)?;

    series.edges = series.edges[keep.clone()].to_vec();
    series.values = series.values[keep.clone()].to_vec();
    series.stat = series.stat[keep.clone()].to_vec();
    series.syst = series.syst[keep].to_vec();

    debug!(
        under = report.under,
        over = report.over,
        retained = report.retained,
        "trimmed series"
    );
    Ok(report)
}
