//! Trade signals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::InstrumentSymbol;

/// Classified trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::Buy => "buy",
            SignalKind::Sell => "sell",
            SignalKind::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// The latest signal for one instrument.
///
/// `stop_loss` and `take_profit` are zero when the kind is `Hold`. Levels on
/// buy and sell are not clamped, so a sell whose ATR target distance equals
/// the close rounds `take_profit` to exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub kind: SignalKind,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub computed_at: DateTime<Utc>,
}

impl Signal {
    /// Long entry with protective levels below/above the close.
    pub fn buy(stop_loss: f64, take_profit: f64, computed_at: DateTime<Utc>) -> Self {
        Self {
            kind: SignalKind::Buy,
            stop_loss,
            take_profit,
            computed_at,
        }
    }

    /// Short entry with protective levels above/below the close.
    pub fn sell(stop_loss: f64, take_profit: f64, computed_at: DateTime<Utc>) -> Self {
        Self {
            kind: SignalKind::Sell,
            stop_loss,
            take_profit,
            computed_at,
        }
    }

    /// No position; both levels are zero.
    pub fn hold(computed_at: DateTime<Utc>) -> Self {
        Self {
            kind: SignalKind::Hold,
            stop_loss: 0.0,
            take_profit: 0.0,
            computed_at,
        }
    }

    /// Whether this signal asks for a position.
    pub fn is_actionable(&self) -> bool {
        self.kind != SignalKind::Hold
    }
}

/// Signals keyed by instrument, as produced by one cycle or held in the cache.
pub type SignalsBatch = BTreeMap<InstrumentSymbol, Signal>;
