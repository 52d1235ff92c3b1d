use std::ops::Range;

/// Splits `total` items into consecutive ranges of at most `batch_size` items
pub fn batch_ranges(total: usize, batch_size: usize) -> Vec<Range<usize>> {
    let batch_size = batch_size.max(1);

    (0..total)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uneven_split() {
        assert_eq!(batch_ranges(7, 3), vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn test_group_count_is_ceiling() {
        for total in 0..20 {
            for size in 1..8 {
                let ranges = batch_ranges(total, size);
                assert_eq!(ranges.len(), total.div_ceil(size));
                assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), total);
            }
        }
    }

    #[test]
    fn test_zero_batch_size_is_treated_as_one() {
        assert_eq!(batch_ranges(2, 0), vec![0..1, 1..2]);
    }
}
