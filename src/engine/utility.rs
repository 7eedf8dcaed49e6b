/// Rounds to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns the largest of `values`, or 0.0 when there are none.
pub fn max_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(None, |acc: Option<f64>, v| {
        Some(match acc {
            Some(m) if m >= v => m,
            _ => v,
        })
    })
    .unwrap_or(0.0)
}
