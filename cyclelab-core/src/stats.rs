//! Small numeric helpers shared by the detectors and the partitioner.

/// Arithmetic mean of the finite values. Returns `None` if there are none.
pub fn finite_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Integer division rounding halves up (`round(n / d)` for non-negative input).
pub fn div_round(numerator: u32, denominator: u32) -> u32 {
    debug_assert!(denominator > 0);
    numerator.saturating_add(denominator / 2) / denominator
}
