#[inline]
pub(super) fn within_bounds(x: f64, (lower, upper): (f64, f64)) -> bool {
    x >= lower && x <= upper
}

/// Clamp every value into its bounds
pub(super) fn clamp_to_bounds(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (x, &(lower, upper)) in x.iter_mut().zip(bounds) {
        *x = x.clamp(lower, upper);
    }
}
