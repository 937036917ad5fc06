//! Indicator values needed by the crossover rule.

use serde::{Deserialize, Serialize};

/// Latest indicator readings for one instrument.
///
/// Recomputed from scratch every cycle and never carried across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Most recent close
    pub close: f64,
    /// Fast EMA one bar before the latest
    pub prev_fast: Option<f64>,
    /// Slow EMA one bar before the latest
    pub prev_slow: Option<f64>,
    /// Latest fast EMA
    pub fast: f64,
    /// Latest slow EMA
    pub slow: f64,
    /// Latest RSI
    pub rsi: f64,
    /// Latest ATR
    pub atr: f64,
}

impl IndicatorSnapshot {
    /// Fast EMA moved from at-or-below the slow EMA to strictly above it.
    ///
    /// Without a previous value for both averages there is no crossover.
    pub fn is_golden_cross(&self) -> bool {
        match (self.prev_fast, self.prev_slow) {
            (Some(prev_fast), Some(prev_slow)) => prev_fast <= prev_slow && self.fast > self.slow,
            _ => false,
        }
    }

    /// Fast EMA moved from at-or-above the slow EMA to strictly below it.
    pub fn is_death_cross(&self) -> bool {
        match (self.prev_fast, self.prev_slow) {
            (Some(prev_fast), Some(prev_slow)) => prev_fast >= prev_slow && self.fast < self.slow,
            _ => false,
        }
    }

    /// Name of the first non-finite reading, if any.
    pub(crate) fn first_non_finite(&self) -> Option<&'static str> {
        let readings = [
            ("close", Some(self.close)),
            ("previous fast EMA", self.prev_fast),
            ("previous slow EMA", self.prev_slow),
            ("fast EMA", Some(self.fast)),
            ("slow EMA", Some(self.slow)),
            ("RSI", Some(self.rsi)),
            ("ATR", Some(self.atr)),
        ];

        readings
            .into_iter()
            .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 1.1,
            prev_fast: Some(prev_fast),
            prev_slow: Some(prev_slow),
            fast,
            slow,
            rsi: 50.0,
            atr: 0.01,
        }
    }

    #[test]
    fn test_golden_cross() {
        assert!(snapshot(1.0, 1.1, 1.2, 1.15).is_golden_cross());
        // touching counts as "at or below" on the previous bar
        assert!(snapshot(1.1, 1.1, 1.2, 1.15).is_golden_cross());
        // still below
        assert!(!snapshot(1.0, 1.1, 1.05, 1.1).is_golden_cross());
    }

    #[test]
    fn test_death_cross() {
        assert!(snapshot(1.2, 1.1, 1.0, 1.05).is_death_cross());
        assert!(!snapshot(1.2, 1.1, 1.15, 1.1).is_death_cross());
    }

    #[test]
    fn test_crosses_are_mutually_exclusive() {
        let values = [1.0, 1.05, 1.1];
        for &pf in &values {
            for &ps in &values {
                for &f in &values {
                    for &s in &values {
                        let snap = snapshot(pf, ps, f, s);
                        assert!(!(snap.is_golden_cross() && snap.is_death_cross()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_previous_value_is_no_cross() {
        let snap = IndicatorSnapshot {
            prev_fast: None,
            prev_slow: None,
            ..snapshot(1.0, 1.1, 1.2, 1.15)
        };
        assert!(!snap.is_golden_cross());
        assert!(!snap.is_death_cross());
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(snapshot(1.0, 1.1, 1.2, 1.15).first_non_finite(), None);

        let snap = IndicatorSnapshot {
            rsi: f64::NAN,
            ..snapshot(1.0, 1.1, 1.2, 1.15)
        };
        assert_eq!(snap.first_non_finite(), Some("RSI"));
    }
}
