// src/provider/fixture.rs

//! Scripted provider for unit tests. Counts every call it receives and
//! remembers which symbols were asked for.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::provider_trait::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{DateWindow, QuoteSnapshot, RawColumn, RawTable, Ticker};

pub(crate) struct MockProvider {
    pub snapshot: QuoteSnapshot,
    pub table: RawTable,
    /// When set, `historical_series` fails with this status code.
    pub fail_status: Option<u16>,
    /// Sleep inside `quote_snapshot`, to hold the worker busy.
    pub delay: Duration,
    quote_calls: AtomicUsize,
    history_calls: AtomicUsize,
    quoted: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(snapshot: QuoteSnapshot, table: RawTable) -> Self {
        Self {
            snapshot,
            table,
            fail_status: None,
            delay: Duration::ZERO,
            quote_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            quoted: Mutex::new(Vec::new()),
        }
    }

    /// Price 150.25 and `rows` weekdays of six Yahoo-named columns.
    pub fn aapl(rows: usize) -> Self {
        Self::new(QuoteSnapshot::with_price(150.25), six_column_table(rows))
    }

    /// Unknown-symbol behaviour: empty snapshot and empty table.
    pub fn empty() -> Self {
        Self::new(QuoteSnapshot::default(), RawTable::default())
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.quote_calls() + self.history_calls()
    }

    /// Symbols passed to `quote_snapshot`, in call order.
    pub fn quoted_tickers(&self) -> Vec<String> {
        self.quoted.lock().clone()
    }
}

impl MarketDataProvider for MockProvider {
    fn quote_snapshot(&self, ticker: &Ticker) -> Result<QuoteSnapshot, ProviderError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quoted.lock().push(ticker.as_str().to_string());
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(self.snapshot.clone())
    }

    fn historical_series(
        &self,
        _ticker: &Ticker,
        _window: &DateWindow,
    ) -> Result<RawTable, ProviderError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_status {
            Some(status) => Err(ProviderError::Status {
                status,
                body: "service unavailable".into(),
            }),
            None => Ok(self.table.clone()),
        }
    }
}

/// Rows on consecutive days from 2024-05-01 with steadily rising values.
pub(crate) fn six_column_table(rows: usize) -> RawTable {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let names = ["Open", "High", "Low", "Close", "Adj Close", "Volume"];
    RawTable {
        index: start.iter_days().take(rows).collect(),
        columns: names
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let base = if *name == "Volume" { 1_000_000.0 } else { 100.0 + c as f64 };
                RawColumn::new(*name, (0..rows).map(|r| base + r as f64).collect())
            })
            .collect(),
    }
}
