//! Splitting a global task specification into `N` roughly-equal worker partitions.

/// Splits `[a, b]` into `n` roughly-equal contiguous sub-ranges via linear spacing of `n+1` cut
/// points, matching the source system's `numpy.linspace(a, b, n+1)` partitioning.
///
/// Returns `n` half-open ranges `[cut[i], cut[i+1])`. The caller's block range is treated as
/// inclusive-exclusive overall (`[a, b)`), so the final cut point lands exactly on `b`.
#[must_use]
pub fn partition_block_range(a: i64, b: i64, n: usize) -> Vec<(i64, i64)> {
    if n == 0 {
        return Vec::new();
    }

    let span = (b - a) as f64;
    let cuts: Vec<i64> =
        (0..=n).map(|i| a + ((span * i as f64) / n as f64).round() as i64).collect();

    (0..n).map(|i| (cuts[i], cuts[i + 1])).collect()
}

/// Splits `contracts` into `n` roughly-equal contiguous slices.
///
/// The first `contracts.len() % n` slices get one extra element, so sizes never differ by more
/// than one.
#[must_use]
pub fn partition_contracts(contracts: &[String], n: usize) -> Vec<Vec<String>> {
    if n == 0 {
        return Vec::new();
    }

    let base = contracts.len() / n;
    let remainder = contracts.len() % n;

    let mut slices = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        slices.push(contracts[start..end].to_vec());
        start = end;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_a_block_range_into_equal_pieces() {
        let parts = partition_block_range(0, 100, 4);
        assert_eq!(parts, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
    }

    #[test]
    fn partitions_are_contiguous_and_cover_the_whole_range() {
        let parts = partition_block_range(10, 37, 3);
        assert_eq!(parts[0].0, 10);
        assert_eq!(parts.last().unwrap().1, 37);
        for window in parts.windows(2) {
            assert_eq!(window[0].1, window[1].0);
        }
    }

    #[test]
    fn partitions_contracts_without_dropping_any() {
        let contracts: Vec<String> = (0..10).map(|i| format!("0x{i}")).collect();
        let slices = partition_contracts(&contracts, 3);
        assert_eq!(slices.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 3, 3]);
        let total: Vec<String> = slices.into_iter().flatten().collect();
        assert_eq!(total, contracts);
    }
}
