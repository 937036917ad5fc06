//! Shared smoothing helpers.

/// Simple average of the first `period` values.
#[inline]
pub(crate) fn seed_average(values: &[f64], period: usize) -> f64 {
    values[..period].iter().sum::<f64>() / period as f64
}

/// Wilder's smoothing: `avg = (prev_avg * (period - 1) + value) / period`.
///
/// Seeded with the simple average of the first `period` values. Callers
/// guarantee `values.len() >= period > 0`.
pub(crate) fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len() - period + 1);
    let period_f64 = period as f64;

    let mut avg = seed_average(values, period);
    result.push(avg);

    for &value in &values[period..] {
        avg = (avg * (period_f64 - 1.0) + value) / period_f64;
        result.push(avg);
    }

    result
}
