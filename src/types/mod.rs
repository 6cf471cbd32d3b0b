// src/types/mod.rs

pub mod quote;
pub mod series;
pub mod ticker;

pub use quote::{PriceDisplay, QuoteSnapshot};
pub use series::{DateWindow, HistoricalSeries, RawColumn, RawTable, SeriesColumn};
pub use ticker::Ticker;
