use dj_core::errors::{DjError, ErrorInfo};

/// Returns group `index` of consecutive groups of `group_size` items.
///
/// Results read in nested loops (centrality outer, flow harmonic inner) are
/// stored flat; group `i` is `items[group_size * i .. group_size * (i + 1)]`.
pub fn select_group<T>(items: &[T], group_size: usize, index: usize) -> Result<&[T], DjError> {
    if group_size == 0 {
        return Err(DjError::Hist(ErrorInfo::new(
            "dj_hist.group_size",
            "group size must be positive",
        )));
    }
    let out_of_range = || {
        DjError::Hist(
            ErrorInfo::new(
                "dj_hist.group_out_of_range",
                format!(
                    "group {index} of size {group_size} lies past the {} available items",
                    items.len()
                ),
            )
            .with_context("group", index.to_string())
            .with_context("items", items.len().to_string()),
        )
    };
    let start = group_size.checked_mul(index).ok_or_else(out_of_range)?;
    let end = start.checked_add(group_size).ok_or_else(out_of_range)?;
    items.get(start..end).ok_or_else(out_of_range)
}

/// Repeats the first value `len` times.
///
/// Used when a systematic uncertainty is quoted once for the whole series.
pub fn broadcast_first(values: &[f64], len: usize) -> Result<Vec<f64>, DjError> {
    let first = values.first().copied().ok_or_else(|| {
        DjError::Hist(ErrorInfo::new(
            "dj_hist.empty_broadcast",
            "cannot broadcast the first value of an empty sequence",
        ))
    })?;
    Ok(vec![first; len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_partition_flat_list() {
        let flat: Vec<usize> = (0..9).collect();
        assert_eq!(select_group(&flat, 3, 0).unwrap(), &[0, 1, 2]);
        assert_eq!(select_group(&flat, 3, 2).unwrap(), &[6, 7, 8]);
    }

    #[test]
    fn group_past_end_fails() {
        let flat: Vec<usize> = (0..8).collect();
        let err = select_group(&flat, 3, 2).unwrap_err();
        assert_eq!(err.info().code, "dj_hist.group_out_of_range");
    }

    #[test]
    fn huge_group_index_fails_instead_of_wrapping() {
        let flat = [1, 2, 3, 4];
        let err = select_group(&flat, 2, usize::MAX / 2 + 1).unwrap_err();
        assert_eq!(err.info().code, "dj_hist.group_out_of_range");
        let err = select_group(&flat, usize::MAX, 1).unwrap_err();
        assert_eq!(err.info().code, "dj_hist.group_out_of_range");
    }

    #[test]
    fn zero_group_size_fails() {
        let flat = [1, 2, 3];
        assert!(select_group(&flat, 0, 0).is_err());
    }

    #[test]
    fn broadcast_repeats_first_value() {
        assert_eq!(broadcast_first(&[0.004, 0.5], 3).unwrap(), vec![0.004; 3]);
        assert!(broadcast_first(&[], 3).is_err());
    }
}
