// src/error.rs

//! The closed set of ways a fetch-and-render run can fail.

use thiserror::Error;

/// Everything the pipeline can report back to the user.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The ticker field was empty (or only whitespace) at submit time.
    #[error("Please enter a ticker symbol.")]
    Input,

    /// The provider returned no rows for the ticker inside the window.
    #[error("No stock data found for the given ticker: {0}")]
    NoData(String),

    /// Network, status or decoding failure inside the data provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The series could not be turned into a chart grid.
    #[error("Failed to render charts: {0}")]
    Render(String),
}

impl TrackerError {
    /// Title of the alert window shown for this error.
    pub fn alert_title(&self) -> &'static str {
        match self {
            TrackerError::Input => "Input Error",
            _ => "Error",
        }
    }
}

/// Failures raised by a [`MarketDataProvider`](crate::MarketDataProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status whose body was not a chart document.
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not valid JSON for the expected shape.
    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The table did not have the expected column layout.
    #[error("Unexpected table layout: {0}")]
    Schema(String),

    /// The table was internally inconsistent (ragged columns, bad timestamps).
    #[error("Malformed provider data: {0}")]
    Malformed(String),

    /// The configured endpoint cannot have path segments appended to it.
    #[error("Invalid provider base URL: {0}")]
    BaseUrl(String),
}
