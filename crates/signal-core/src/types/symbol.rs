//! Instrument identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque instrument identifier such as `EURUSD`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentSymbol(String);

impl InstrumentSymbol {
    /// Create a symbol, normalising to upper case without surrounding whitespace.
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    /// Get the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentSymbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InstrumentSymbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for InstrumentSymbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}
