//! EMA crossover rule with RSI confirmation.
//!
//! Generates buy signals when the fast EMA crosses above the slow EMA while
//! RSI is below the overbought threshold, and sell signals when the fast EMA
//! crosses below the slow EMA while RSI is above the oversold threshold.
//! Stop-loss and take-profit sit a multiple of ATR away from the latest close.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::traits::Indicator;
use signal_core::{
    error::{SignalError, StrategyError},
    traits::{SignalRule, StrategyConfig},
    types::{PriceHistory, Signal},
};
use signal_indicators::{Atr, Ema, Rsi};
use tracing::debug;

use crate::snapshot::IndicatorSnapshot;

/// Configuration for the crossover rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverParams {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period; also the minimum usable history length
    pub slow_period: usize,
    /// RSI period
    pub rsi_period: usize,
    /// RSI level at or above which buys are suppressed
    pub rsi_overbought: f64,
    /// RSI level at or below which sells are suppressed
    pub rsi_oversold: f64,
    /// ATR period
    pub atr_period: usize,
    /// Stop-loss distance in ATRs
    pub stop_loss_atr_multiplier: f64,
    /// Take-profit distance in ATRs
    pub take_profit_atr_multiplier: f64,
    /// Decimal places the stop-loss/take-profit levels are rounded to
    pub price_decimals: u32,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            atr_period: 14,
            stop_loss_atr_multiplier: 2.0,
            take_profit_atr_multiplier: 4.0,
            price_decimals: 5,
        }
    }
}

impl StrategyConfig for CrossoverParams {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.rsi_period == 0 || self.atr_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Indicator periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.rsi_oversold) || !in_range(self.rsi_overbought) {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must lie within 0..=100".into(),
            ));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(StrategyError::InvalidConfig(
                "RSI oversold threshold must be below overbought threshold".into(),
            ));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.stop_loss_atr_multiplier) || !positive(self.take_profit_atr_multiplier) {
            return Err(StrategyError::InvalidConfig(
                "ATR multipliers must be positive".into(),
            ));
        }
        if self.price_decimals > 10 {
            return Err(StrategyError::InvalidConfig(
                "Price decimals must be at most 10".into(),
            ));
        }
        Ok(())
    }
}

/// Stateless evaluator applying the crossover rule to a price history.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    params: CrossoverParams,
    fast: Ema,
    slow: Ema,
    rsi: Rsi,
    atr: Atr,
}

impl SignalEvaluator {
    /// Create an evaluator from validated parameters.
    pub fn new(params: CrossoverParams) -> Result<Self, StrategyError> {
        params.validate()?;
        Ok(Self {
            fast: Ema::new(params.fast_period),
            slow: Ema::new(params.slow_period),
            rsi: Rsi::new(params.rsi_period),
            atr: Atr::new(params.atr_period),
            params,
        })
    }

    /// Get the rule parameters.
    pub fn params(&self) -> &CrossoverParams {
        &self.params
    }

    /// Compute the indicator readings for the latest bar.
    pub fn snapshot(&self, history: &PriceHistory) -> Result<IndicatorSnapshot, SignalError> {
        let available = history.len();
        let last = match history.last() {
            Some(bar) if available >= self.params.slow_period => *bar,
            _ => {
                return Err(SignalError::InsufficientData {
                    required: self.params.slow_period,
                    available,
                })
            }
        };

        let closes = history.closes();
        let fast = self.fast.calculate(&closes)?;
        let slow = self.slow.calculate(&closes)?;
        let rsi = self.rsi.calculate(&closes)?;
        let atr = self.atr.calculate_bars(history.bars())?;

        let snapshot = IndicatorSnapshot {
            close: last.close,
            prev_fast: previous(&fast),
            prev_slow: previous(&slow),
            fast: latest(&fast)?,
            slow: latest(&slow)?,
            rsi: latest(&rsi)?,
            atr: latest(&atr)?,
        };

        if let Some(name) = snapshot.first_non_finite() {
            return Err(SignalError::Computation(format!(
                "{} for {} is not a finite number",
                name, history.symbol
            )));
        }

        Ok(snapshot)
    }

    /// Apply the rule to a snapshot. First match wins: golden cross, then
    /// death cross, otherwise hold.
    pub fn classify(&self, snapshot: &IndicatorSnapshot, computed_at: DateTime<Utc>) -> Signal {
        let p = &self.params;
        let stop_distance = snapshot.atr * p.stop_loss_atr_multiplier;
        let target_distance = snapshot.atr * p.take_profit_atr_multiplier;

        if snapshot.is_golden_cross() && snapshot.rsi < p.rsi_overbought {
            Signal::buy(
                self.round_price(snapshot.close - stop_distance),
                self.round_price(snapshot.close + target_distance),
                computed_at,
            )
        } else if snapshot.is_death_cross() && snapshot.rsi > p.rsi_oversold {
            Signal::sell(
                self.round_price(snapshot.close + stop_distance),
                self.round_price(snapshot.close - target_distance),
                computed_at,
            )
        } else {
            Signal::hold(computed_at)
        }
    }

    fn round_price(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.params.price_decimals as i32);
        (value * scale).round() / scale
    }
}

impl SignalRule for SignalEvaluator {
    fn name(&self) -> &str {
        "EMA Crossover"
    }

    fn min_history(&self) -> usize {
        self.params.slow_period
    }

    fn evaluate(
        &self,
        history: &PriceHistory,
        computed_at: DateTime<Utc>,
    ) -> Result<Signal, SignalError> {
        let snapshot = self.snapshot(history)?;
        let signal = self.classify(&snapshot, computed_at);

        debug!(
            symbol = %history.symbol,
            fast = snapshot.fast,
            slow = snapshot.slow,
            rsi = snapshot.rsi,
            atr = snapshot.atr,
            kind = %signal.kind,
            "Evaluated crossover rule"
        );

        Ok(signal)
    }
}

fn latest(values: &[f64]) -> Result<f64, SignalError> {
    values
        .last()
        .copied()
        .ok_or_else(|| SignalError::Computation("indicator produced no values".into()))
}

fn previous(values: &[f64]) -> Option<f64> {
    values.len().checked_sub(2).map(|i| values[i])
}
