//! Volatility indicators.

use signal_core::error::IndicatorError;
use signal_core::traits::RangeIndicator;
use signal_core::types::PriceBar;

use crate::smoothing::wilder_smooth;

/// Average True Range (ATR).
///
/// Measures market volatility by decomposing the entire range
/// of an asset price for that period.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Get the smoothing period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate ATR directly from bars.
    pub fn calculate_bars(&self, bars: &[PriceBar]) -> Result<Vec<f64>, IndicatorError> {
        self.check_len(bars.len())?;

        let true_ranges: Vec<f64> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| bar.true_range(i.checked_sub(1).map(|p| bars[p].close)))
            .collect();

        Ok(wilder_smooth(&true_ranges, self.period))
    }

    fn check_len(&self, len: usize) -> Result<(), IndicatorError> {
        if len < self.min_len() {
            return Err(IndicatorError::InsufficientData {
                required: self.min_len(),
                available: len,
            });
        }
        Ok(())
    }
}

impl RangeIndicator for Atr {
    fn calculate_hlc(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
    ) -> Result<Vec<f64>, IndicatorError> {
        if high.len() != low.len() || low.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(format!(
                "series length mismatch: high={}, low={}, close={}",
                high.len(),
                low.len(),
                close.len()
            )));
        }

        let bars: Vec<PriceBar> = high
            .iter()
            .zip(low)
            .zip(close)
            .enumerate()
            .map(|(i, ((&h, &l), &c))| PriceBar::new(i as i64, c, h, l, c))
            .collect();

        self.calculate_bars(&bars)
    }

    fn min_len(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atr_hlc() {
        let atr = Atr::new(3);
        let high = vec![10.0, 11.0, 12.0, 11.0, 13.0, 14.0];
        let low = vec![8.0, 9.0, 10.0, 9.0, 11.0, 12.0];
        let close = vec![9.0, 10.0, 11.0, 10.0, 12.0, 13.0];

        let result = atr.calculate_hlc(&high, &low, &close).unwrap();
        assert_eq!(result.len(), high.len() - 3 + 1);

        // True ranges: 2 (first bar, high-low), 2, 2, 2, 3, 2
        assert!((result[0] - 2.0).abs() < 1e-10);
        assert!((result[1] - 2.0).abs() < 1e-10);
        // (2*2 + 3)/3
        assert!((result[2] - 7.0 / 3.0).abs() < 1e-10);
        // (7/3*2 + 2)/3
        assert!((result[3] - 20.0 / 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_atr_gap_uses_previous_close() {
        let atr = Atr::new(1);
        // Second bar gaps up: |high - prev close| = 5 dominates its 1.0 range
        let high = vec![10.0, 15.0];
        let low = vec![9.0, 14.0];
        let close = vec![10.0, 14.5];

        let result = atr.calculate_hlc(&high, &low, &close).unwrap();
        assert_eq!(result.len(), 2);
        assert!((result[0] - 1.0).abs() < 1e-10);
        assert!((result[1] - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_atr_non_negative() {
        let atr = Atr::new(14);
        let bars: Vec<PriceBar> = (0..60)
            .map(|i| {
                let mid = 1.1 + (i as f64 * 0.4).sin() * 0.01;
                PriceBar::new(i, mid, mid + 0.004, mid - 0.003, mid + 0.001)
            })
            .collect();

        let result = atr.calculate_bars(&bars).unwrap();
        assert!(result.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_atr_insufficient_data() {
        let atr = Atr::new(14);
        let err = atr
            .calculate_hlc(&[1.0; 14], &[0.5; 14], &[0.8; 14])
            .unwrap_err();

        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 15,
                available: 14
            }
        );
    }

    #[test]
    fn test_atr_length_mismatch() {
        let atr = Atr::new(2);
        let err = atr
            .calculate_hlc(&[1.0, 2.0, 3.0], &[0.5, 1.5], &[0.8, 1.8, 2.8])
            .unwrap_err();

        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }
}
