// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod chart;
pub mod config;
pub mod controller;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod stocks;
pub mod types;
pub mod worker;

// === 2. Re-export the public-facing components to create a clean API ===

// --- From `controller` and `pipeline` ---
pub use controller::{Alert, Controller, Outcome, Phase};
pub use pipeline::{Fetched, MountedPanel, ViewState};

// --- From `chart` ---
pub use chart::{ChartGrid, ChartPanel, GridStyle, format_date_tick};

// --- From `provider` ---
pub use provider::{MarketDataProvider, SyntheticProvider, YahooProvider};

// --- From `worker` ---
pub use worker::{FetchReport, FetchWorker, JobId};

// --- From `types` ---
pub use types::{
    DateWindow, HistoricalSeries, PriceDisplay, QuoteSnapshot, RawColumn, RawTable, SeriesColumn,
    Ticker,
};

// --- From `error` ---
pub use error::{ProviderError, TrackerError};
