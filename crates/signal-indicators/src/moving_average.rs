//! Moving average indicators.

use signal_core::error::IndicatorError;
use signal_core::traits::Indicator;

use crate::smoothing::seed_average;

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay. The first
/// output is the simple average of the first `period` values; every later
/// output applies `ema = value * k + prev * (1 - k)` with `k = 2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self { period, multiplier }
    }
}

impl Indicator for Ema {
    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;

        let mut result = Vec::with_capacity(data.len() - self.period + 1);

        let mut ema = seed_average(data, self.period);
        result.push(ema);

        let one_minus_mult = 1.0 - self.multiplier;
        for &price in &data[self.period..] {
            ema = price * self.multiplier + ema * one_minus_mult;
            result.push(ema);
        }

        Ok(result)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema() {
        let ema = Ema::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = ema.calculate(&data).unwrap();

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 1e-10); // Initial SMA
        // mult = 2/(3+1) = 0.5
        // result[1] = 4 * 0.5 + 2 * 0.5 = 3.0
        assert!((result[1] - 3.0).abs() < 1e-10);
        // result[2] = 5 * 0.5 + 3 * 0.5 = 4.0
        assert!((result[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_length_and_seed() {
        let data: Vec<f64> = (0..40).map(|i| 1.1 + (i as f64 * 0.3).sin() * 0.02).collect();

        for period in [1, 3, 5, 12, 26, 40] {
            let result = Ema::new(period).calculate(&data).unwrap();
            assert_eq!(result.len(), data.len() - period + 1);

            let mean = data[..period].iter().sum::<f64>() / period as f64;
            assert!((result[0] - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ema_exact_period_yields_single_value() {
        let result = Ema::new(4).calculate(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(result, vec![2.5]);
    }

    #[test]
    fn test_ema_insufficient_data() {
        let ema = Ema::new(5);
        let err = ema.calculate(&[1.0, 2.0, 3.0]).unwrap_err();

        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 5,
                available: 3
            }
        );
    }
}
