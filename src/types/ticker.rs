// src/types/ticker.rs

use std::fmt;

use crate::error::TrackerError;

/// A user-supplied security symbol (e.g. "AAPL").
///
/// Only non-emptiness is checked here. Whether the symbol is real is decided
/// by the provider returning data for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Validates the raw text of the input field.
    ///
    /// Surrounding whitespace is stripped; an empty result is an
    /// [`TrackerError::Input`].
    pub fn parse(input: &str) -> Result<Self, TrackerError> {
        let symbol = input.trim();
        if symbol.is_empty() {
            return Err(TrackerError::Input);
        }
        Ok(Self(symbol.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
