// src/types/series.rs

use chrono::NaiveDate;
use std::fmt;

use crate::error::ProviderError;
use crate::types::Ticker;

/// Half-open calendar window `[start, end)` of daily history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `None` unless `start < end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl Default for DateWindow {
    /// 2024-05-01 through 2024-10-01.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid calendar date"),
            end: NaiveDate::from_ymd_opt(2024, 10, 1).expect("valid calendar date"),
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// One provider-named column.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A date-indexed table exactly as the provider shaped it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub index: Vec<NaiveDate>,
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// The six charted columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesColumn {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl SeriesColumn {
    pub const ALL: [SeriesColumn; 6] = [
        SeriesColumn::Open,
        SeriesColumn::High,
        SeriesColumn::Low,
        SeriesColumn::Close,
        SeriesColumn::AdjClose,
        SeriesColumn::Volume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeriesColumn::Open => "Open Price",
            SeriesColumn::High => "High Price",
            SeriesColumn::Low => "Low Price",
            SeriesColumn::Close => "Close Price",
            SeriesColumn::AdjClose => "Adjusted Close Price",
            SeriesColumn::Volume => "Volume",
        }
    }

    pub fn position(self) -> usize {
        self as usize
    }
}

/// Daily OHLCV plus adjusted close for one ticker, relabelled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    ticker: Ticker,
    index: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl HistoricalSeries {
    /// Renames the provider's columns positionally onto [`SeriesColumn::ALL`].
    ///
    /// The provider's own column names are ignored. A table with any other
    /// column count is rejected instead of being silently mislabelled.
    pub fn from_raw(ticker: Ticker, raw: RawTable) -> Result<Self, ProviderError> {
        if raw.columns.len() != SeriesColumn::ALL.len() {
            let names: Vec<&str> = raw.columns.iter().map(|c| c.name.as_str()).collect();
            return Err(ProviderError::Schema(format!(
                "expected {} columns, got {} ({})",
                SeriesColumn::ALL.len(),
                names.len(),
                names.join(", ")
            )));
        }
        if let Some(ragged) = raw.columns.iter().find(|c| c.values.len() != raw.index.len()) {
            return Err(ProviderError::Malformed(format!(
                "column {} has {} values for {} dates",
                ragged.name,
                ragged.values.len(),
                raw.index.len()
            )));
        }

        Ok(Self {
            ticker,
            index: raw.index,
            columns: raw.columns.into_iter().map(|c| c.values).collect(),
        })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column(&self, column: SeriesColumn) -> &[f64] {
        &self.columns[column.position()]
    }

    /// Columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = (SeriesColumn, &[f64])> {
        SeriesColumn::ALL
            .into_iter()
            .zip(self.columns.iter().map(Vec::as_slice))
    }
}
