// src/provider/provider_trait.rs

use crate::error::ProviderError;
use crate::types::{DateWindow, QuoteSnapshot, RawTable, Ticker};

/// A remote (or generated) source of market data.
/// The pipeline only ever talks to this trait, so sources are pluggable.
///
/// Implementations are shared with the background fetch thread, hence `Send + Sync`.
pub trait MarketDataProvider: Send + Sync {
    /// Latest field set for the symbol. An unknown symbol yields an empty
    /// snapshot rather than an error.
    fn quote_snapshot(&self, ticker: &Ticker) -> Result<QuoteSnapshot, ProviderError>;

    /// Daily rows for `window`, six columns in provider order.
    /// An unknown symbol yields an empty table.
    fn historical_series(
        &self,
        ticker: &Ticker,
        window: &DateWindow,
    ) -> Result<RawTable, ProviderError>;
}
