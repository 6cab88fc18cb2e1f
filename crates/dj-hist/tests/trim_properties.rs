use dj_hist::{over_range_count, trim, under_range_count, BinEdges, BinnedSeries, TrimCuts};
use proptest::prelude::*;

fn build_series(widths: &[f64]) -> BinnedSeries {
    let mut edges: Vec<BinEdges> = Vec::with_capacity(widths.len());
    let mut lo = 0.0;
    for width in widths {
        edges.push((lo, lo + width));
        lo += width;
    }
    let n = edges.len();
    BinnedSeries {
        edges,
        values: (0..n).map(|i| i as f64).collect(),
        stat: (0..n).map(|i| 0.5 + i as f64).collect(),
        syst: (0..n).map(|i| 1.5 + i as f64).collect(),
    }
}

proptest! {
    #[test]
    fn upper_cut_removes_exactly_bins_above(widths in prop::collection::vec(0.05f64..1.0, 2..24), frac in 0.05f64..1.0) {
        let mut series = build_series(&widths);
        let total = series.len();
        let top = series.edges[total - 1].1;
        let cut = top * frac;
        let expected_removed = series.edges.iter().filter(|(_, hi)| *hi > cut).count();
        let original = series.clone();

        match trim(&mut series, &TrimCuts::upper(cut)) {
            Ok(report) => {
                prop_assert_eq!(report.over, expected_removed);
                prop_assert_eq!(report.under, 0);
                prop_assert_eq!(series.edges.len(), total - expected_removed);
                prop_assert_eq!(series.values.len(), total - expected_removed);
                prop_assert_eq!(series.stat.len(), total - expected_removed);
                prop_assert_eq!(series.syst.len(), total - expected_removed);
                prop_assert_eq!(&series.values[..], &original.values[..series.len()]);
                prop_assert_eq!(&series.edges[..], &original.edges[..series.len()]);
            }
            Err(_) => {
                prop_assert_eq!(expected_removed, total);
                prop_assert_eq!(series, original);
            }
        }
    }

    #[test]
    fn combined_cuts_do_not_double_count(widths in prop::collection::vec(0.05f64..1.0, 3..24), low in 0.0f64..0.5, high in 0.5f64..1.0) {
        let mut series = build_series(&widths);
        let total = series.len();
        let top = series.edges[total - 1].1;
        let cuts = TrimCuts::range(top * low, top * high);
        let under = under_range_count(&series.edges, top * low);
        let over = over_range_count(&series.edges, top * high);
        let original = series.clone();

        if let Ok(report) = trim(&mut series, &cuts) {
            prop_assert_eq!(report.under, under);
            prop_assert_eq!(report.over, over);
            prop_assert_eq!(report.retained, total - under - over);
            prop_assert_eq!(&series.syst[..], &original.syst[under..total - over]);
            prop_assert!(series.edges.iter().all(|(_, hi)| *hi >= top * low && *hi <= top * high));
        } else {
            prop_assert!(under + over >= total);
        }
    }
}
