// src/config.rs

//! A centralized place for the tracker's fixed parameters and its CLI.

use chrono::NaiveDate;
use clap::Parser;
use std::time::Duration;

use crate::types::DateWindow;

// --- History window ---
// The provider treats the end date as exclusive.
pub const DEFAULT_START: &str = "2024-05-01";
pub const DEFAULT_END: &str = "2024-10-01";

// --- Chart layout ---
pub const GRID_ROWS: usize = 3;
pub const GRID_COLS: usize = 2;
pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Value";
pub const LINE_WIDTH: f32 = 2.0;
pub const GRID_ALPHA: f32 = 0.5;
/// Gridlines drawn per axis, before rounding to "nice" values.
pub const GRID_TICKS: usize = 6;
/// Position-matched to `SeriesColumn::ALL`.
pub const PALETTE: [[u8; 3]; 6] = [
    [0xFF, 0x57, 0x33],
    [0x33, 0xFF, 0x57],
    [0x33, 0x57, 0xFF],
    [0xFF, 0x33, 0xF6],
    [0xF6, 0xA8, 0x33],
    [0x33, 0xF6, 0xFF],
];

// --- Window ---
pub const WINDOW_TITLE: &str = "Stock Price Tracker";
pub const WINDOW_SIZE: [f32; 2] = [1000.0, 800.0];

// --- Yahoo Finance ---
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Fetch a ticker's price history and chart it", long_about = None)]
pub struct Args {
    /// Serve generated prices for a small built-in universe instead of calling Yahoo.
    #[clap(long)]
    pub offline: bool,

    /// First calendar day of the history window (inclusive).
    #[clap(long, default_value = DEFAULT_START)]
    pub start: NaiveDate,

    /// Last calendar day of the history window (exclusive).
    #[clap(long, default_value = DEFAULT_END)]
    pub end: NaiveDate,

    /// Per-request timeout for the data provider.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Base URL of the chart API.
    #[clap(long, default_value = YAHOO_BASE_URL)]
    pub base_url: String,
}

impl Args {
    /// The history window, or a message when `start` is not before `end`.
    pub fn window(&self) -> Result<DateWindow, String> {
        DateWindow::new(self.start, self.end)
            .ok_or_else(|| format!("start {} must be before end {}", self.start, self.end))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
