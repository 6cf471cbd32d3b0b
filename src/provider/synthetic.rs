// src/provider/synthetic.rs

//! Offline provider: geometric Brownian motion price paths for a fixed universe.

use chrono::{Datelike, NaiveDate, Weekday};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde_json::json;

use super::provider_trait::MarketDataProvider;
use crate::error::ProviderError;
use crate::stocks::{ListedStock, StockUniverse};
use crate::types::{DateWindow, QuoteSnapshot, RawColumn, RawTable, Ticker};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Overnight gap between the previous close and the next open.
const GAP_VOLATILITY: f64 = 0.003;
/// How far the intraday extremes reach past the open/close body.
const WICK_VOLATILITY: f64 = 0.004;
/// Dividend adjustment applied to the adjusted close.
const ADJ_CLOSE_FACTOR: f64 = 0.995;

/// Column names in the same order Yahoo uses.
pub const PROVIDER_COLUMNS: [&str; 6] = ["Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// One daily step of a GBM price walk.
struct GbmPath {
    drift: f64,
    volatility: f64,
    current_price: f64,
    rng: StdRng,
}

impl GbmPath {
    fn new(stock: &ListedStock) -> Self {
        Self {
            drift: stock.drift,
            volatility: stock.volatility,
            current_price: stock.initial_price,
            rng: StdRng::seed_from_u64(stock.id),
        }
    }

    fn shock(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    fn step(&mut self) -> f64 {
        let daily_drift = self.drift / TRADING_DAYS_PER_YEAR;
        let daily_volatility = self.volatility / TRADING_DAYS_PER_YEAR.sqrt();
        let z = self.shock();
        // Itô correction keeps the expected growth at `drift`.
        self.current_price *=
            ((daily_drift - 0.5 * daily_volatility.powi(2)) + daily_volatility * z).exp();
        self.current_price
    }
}

/// Serves generated daily history for the symbols in its universe.
/// Unknown symbols get an empty snapshot and an empty table.
pub struct SyntheticProvider {
    universe: StockUniverse,
    quote_window: DateWindow,
}

impl SyntheticProvider {
    /// `quote_window` decides which path's last close is quoted as the current price.
    pub fn new(universe: StockUniverse, quote_window: DateWindow) -> Self {
        Self {
            universe,
            quote_window,
        }
    }

    pub fn universe(&self) -> &StockUniverse {
        &self.universe
    }

    fn generate(stock: &ListedStock, window: &DateWindow) -> RawTable {
        let mut path = GbmPath::new(stock);
        let mut index = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); PROVIDER_COLUMNS.len()];

        for date in trading_days(window) {
            let prev_close = path.current_price;
            let open = prev_close * (1.0 + GAP_VOLATILITY * path.shock());
            let close = path.step();
            let high = open.max(close) * (1.0 + WICK_VOLATILITY * path.shock().abs());
            let low = open.min(close) * (1.0 - WICK_VOLATILITY * path.shock().abs());
            let volume = (stock.avg_volume as f64 * path.rng.gen_range(0.6..1.4)).round();

            index.push(date);
            for (column, value) in columns
                .iter_mut()
                .zip([open, high, low, close, close * ADJ_CLOSE_FACTOR, volume])
            {
                column.push(round_cents(value));
            }
        }

        RawTable {
            index,
            columns: PROVIDER_COLUMNS
                .iter()
                .zip(columns)
                .map(|(name, values)| RawColumn::new(*name, values))
                .collect(),
        }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new(StockUniverse::default(), DateWindow::default())
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn quote_snapshot(&self, ticker: &Ticker) -> Result<QuoteSnapshot, ProviderError> {
        let Some(stock) = self.universe.get_by_ticker(ticker.as_str()) else {
            debug!("[{ticker}] not in the offline universe");
            return Ok(QuoteSnapshot::default());
        };
        let table = Self::generate(stock, &self.quote_window);
        let mut snapshot = QuoteSnapshot::default();
        snapshot.insert("symbol", json!(stock.ticker));
        snapshot.insert("longName", json!(stock.company_name));
        snapshot.insert("currency", json!("USD"));
        // Close is the fourth provider column.
        if let Some(last_close) = table.columns.get(3).and_then(|c| c.values.last()) {
            snapshot.insert(QuoteSnapshot::CURRENT_PRICE, json!(last_close));
        }
        Ok(snapshot)
    }

    fn historical_series(
        &self,
        ticker: &Ticker,
        window: &DateWindow,
    ) -> Result<RawTable, ProviderError> {
        match self.universe.get_by_ticker(ticker.as_str()) {
            Some(stock) => Ok(Self::generate(stock, window)),
            None => Ok(RawTable::default()),
        }
    }
}

/// Weekdays inside the window. Holidays are not modelled.
fn trading_days(window: &DateWindow) -> impl Iterator<Item = NaiveDate> + '_ {
    window
        .start
        .iter_days()
        .take_while(|date| *date < window.end)
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
