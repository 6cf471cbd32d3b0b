// src/stocks/definitions.rs
//! Listed companies known to the offline data provider.
//
//! Extend `default_stock_universe()` with more entries whenever you want
//! another symbol to chart without a network connection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Facts needed to generate a plausible price history for a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedStock {
    /// NASDAQ / NYSE ticker (e.g. "AAPL").
    pub ticker: String,
    /// Unique id; doubles as the RNG seed so every run draws the same path.
    pub id: u64,
    /// Human-readable company name.
    pub company_name: String,
    /// Close on the day before the window opens.
    pub initial_price: f64,
    /// Annualised drift of the price walk.
    pub drift: f64,
    /// Annualised volatility of the price walk.
    pub volatility: f64,
    /// Typical shares traded per session.
    pub avg_volume: u64,
}

impl ListedStock {
    #[inline]
    pub fn new<T1: Into<String>, T2: Into<String>>(
        ticker: T1,
        id: u64,
        company_name: T2,
        initial_price: f64,
        drift: f64,
        volatility: f64,
        avg_volume: u64,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            id,
            company_name: company_name.into(),
            initial_price,
            drift,
            volatility,
            avg_volume,
        }
    }
}

/// The listings available offline.
#[inline]
pub fn default_stock_universe() -> Vec<ListedStock> {
    vec![
        ListedStock::new("AAPL", 1, "Apple Inc.", 169.30, 0.20, 0.22, 55_000_000),
        ListedStock::new("MSFT", 2, "Microsoft Corporation", 389.33, 0.12, 0.20, 20_000_000),
        ListedStock::new("NVDA", 3, "NVIDIA Corporation", 86.40, 0.45, 0.50, 400_000_000),
        ListedStock::new("AMZN", 4, "Amazon.com, Inc.", 175.00, 0.10, 0.28, 45_000_000),
        ListedStock::new("KO", 5, "The Coca-Cola Company", 61.78, 0.05, 0.12, 13_000_000),
    ]
}

/// Ticker lookup over a set of listings. Symbols match case-insensitively.
#[derive(Debug, Clone)]
pub struct StockUniverse {
    stocks: Vec<ListedStock>,
    ticker_to_index: HashMap<String, usize>,
}

impl StockUniverse {
    pub fn new(stocks: Vec<ListedStock>) -> Self {
        let ticker_to_index = stocks
            .iter()
            .enumerate()
            .map(|(i, s)| (s.ticker.to_uppercase(), i))
            .collect();
        Self {
            stocks,
            ticker_to_index,
        }
    }

    pub fn get_by_ticker(&self, ticker: &str) -> Option<&ListedStock> {
        self.ticker_to_index
            .get(&ticker.to_uppercase())
            .map(|&i| &self.stocks[i])
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.stocks.iter().map(|s| s.ticker.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

impl Default for StockUniverse {
    fn default() -> Self {
        Self::new(default_stock_universe())
    }
}
