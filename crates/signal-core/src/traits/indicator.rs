//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for technical indicators computed over a single price series.
///
/// Indicators are pure: the same input always yields the same output and no
/// state is carried between calls.
pub trait Indicator: Send + Sync {
    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input values, oldest first
    ///
    /// # Returns
    /// Indicator values, oldest first, or `InsufficientData` when the series
    /// is shorter than [`Indicator::min_len`]
    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError>;

    /// Get the indicator's lookback period.
    fn period(&self) -> usize;

    /// Get the minimum data points required.
    fn min_len(&self) -> usize {
        self.period()
    }

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.min_len() {
            return Err(IndicatorError::InsufficientData {
                required: self.min_len(),
                available: data.len(),
            });
        }
        Ok(())
    }
}

/// Indicator that needs the full high/low/close range of each bar.
pub trait RangeIndicator: Send + Sync {
    /// Calculate indicator values from aligned high, low and close series.
    fn calculate_hlc(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
    ) -> Result<Vec<f64>, IndicatorError>;

    /// Get the minimum number of bars required.
    fn min_len(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestIndicator {
        period: usize,
    }

    impl Indicator for TestIndicator {
        fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
            self.validate_data(data)?;
            // Simple sum indicator for testing
            Ok(data.windows(self.period).map(|w| w.iter().sum()).collect())
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_indicator_validation() {
        let indicator = TestIndicator { period: 5 };

        assert_eq!(
            indicator.validate_data(&[1.0, 2.0, 3.0]),
            Err(IndicatorError::InsufficientData {
                required: 5,
                available: 3
            })
        );
        assert!(indicator.validate_data(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_ok());
    }

    #[test]
    fn test_indicator_calculate() {
        let indicator = TestIndicator { period: 3 };
        let result = indicator.calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        assert_eq!(result.len(), 3);
        assert!((result[0] - 6.0).abs() < 0.001); // 1+2+3
        assert!((result[2] - 12.0).abs() < 0.001); // 3+4+5
    }
}
