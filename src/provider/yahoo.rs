// src/provider/yahoo.rs

//! Yahoo Finance v8 chart endpoint.

use chrono::{DateTime, NaiveDate, NaiveTime};
use log::{debug, error, trace, warn};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use super::provider_trait::MarketDataProvider;
use crate::config::USER_AGENT;
use crate::error::ProviderError;
use crate::types::{DateWindow, QuoteSnapshot, RawColumn, RawTable, Ticker};

/// Meta field carrying the last traded price.
const MARKET_PRICE_FIELD: &str = "regularMarketPrice";
/// Error code Yahoo uses for unknown or delisted symbols.
const NOT_FOUND: &str = "Not Found";
/// Longest slice of an error body kept in a `ProviderError::Status`.
const MAX_ERROR_BODY: usize = 200;

/// Blocking client for the chart API. Meant to run on the fetch worker, never
/// on the GUI thread.
pub struct YahooProvider {
    client: Client,
    base_url: Url,
}

impl YahooProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ProviderError::BaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ProviderError::BaseUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// `{base}/v8/finance/chart/{SYMBOL}`. The symbol is pushed as a single
    /// path segment, so `#`, `?` and `/` in it are percent-encoded.
    fn chart_url(&self, ticker: &Ticker) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart"])
                .push(&ticker.as_str().to_uppercase());
        }
        url
    }

    fn snapshot_url(&self, ticker: &Ticker) -> Url {
        let mut url = self.chart_url(ticker);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        url
    }

    fn history_url(&self, ticker: &Ticker, window: &DateWindow) -> Url {
        let mut url = self.chart_url(ticker);
        url.query_pairs_mut()
            .append_pair("period1", &unix_midnight(window.start).to_string())
            .append_pair("period2", &unix_midnight(window.end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "div|split")
            .append_pair("includeAdjustedClose", "true");
        url
    }

    fn get_chart(&self, ticker: &Ticker, url: Url) -> Result<Option<ChartResult>, ProviderError> {
        let response = self.client.get(url.clone()).send().map_err(|e| {
            error!("[{ticker}] failed to fetch chart response | ERROR: {e} | URL: {url}");
            e
        })?;
        let status = response.status().as_u16();
        let body = response.text()?;
        trace!("[{ticker}] chart response status {status}, {} bytes", body.len());
        parse_chart(status, &body)
    }
}

impl MarketDataProvider for YahooProvider {
    fn quote_snapshot(&self, ticker: &Ticker) -> Result<QuoteSnapshot, ProviderError> {
        let chart = self.get_chart(ticker, self.snapshot_url(ticker))?;
        Ok(snapshot_from_chart(chart))
    }

    fn historical_series(
        &self,
        ticker: &Ticker,
        window: &DateWindow,
    ) -> Result<RawTable, ProviderError> {
        match self.get_chart(ticker, self.history_url(ticker, window))? {
            Some(chart) => table_from_chart(ticker, chart, window),
            None => Ok(RawTable::default()),
        }
    }
}

// >> Input: Yahoo Finance
// ==========================================================================
#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    meta: Map<String, Value>,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Decodes a chart body. `Ok(None)` means the symbol is unknown to Yahoo.
fn parse_chart(status: u16, body: &str) -> Result<Option<ChartResult>, ProviderError> {
    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if !(200..300).contains(&status) => {
            debug!("unparseable error body ({e})");
            return Err(ProviderError::Status {
                status,
                body: truncate(body),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(err) = envelope.chart.error {
        let description = err.description.unwrap_or_default();
        if err.code == NOT_FOUND {
            debug!("chart lookup returned {}: {description}", err.code);
            return Ok(None);
        }
        return Err(ProviderError::Status {
            status,
            body: format!("{}: {description}", err.code),
        });
    }

    Ok(envelope.chart.result.and_then(|r| r.into_iter().next()))
}

fn snapshot_from_chart(chart: Option<ChartResult>) -> QuoteSnapshot {
    let Some(chart) = chart else {
        return QuoteSnapshot::default();
    };
    let price = chart.meta.get(MARKET_PRICE_FIELD).cloned();
    let mut snapshot = QuoteSnapshot::new(chart.meta);
    if let Some(price) = price.filter(Value::is_number) {
        snapshot.insert(QuoteSnapshot::CURRENT_PRICE, price);
    }
    snapshot
}

/// Builds the provider-ordered table: Open, High, Low, Close, Adj Close, Volume.
///
/// Timestamps are shifted by the exchange's `gmtoffset` before taking the
/// date. Rows with a missing value or outside the window are dropped.
fn table_from_chart(
    ticker: &Ticker,
    chart: ChartResult,
    window: &DateWindow,
) -> Result<RawTable, ProviderError> {
    let Some(quote) = chart.indicators.quote.into_iter().next() else {
        return Ok(RawTable::default());
    };
    if chart.timestamp.is_empty() {
        return Ok(RawTable::default());
    }
    let offset = chart.meta.get("gmtoffset").and_then(Value::as_i64).unwrap_or(0);

    let mut sources = vec![
        ("Open", quote.open),
        ("High", quote.high),
        ("Low", quote.low),
        ("Close", quote.close),
    ];
    match chart.indicators.adjclose.into_iter().next() {
        Some(block) => sources.push(("Adj Close", block.adjclose)),
        None => warn!("[{ticker}] response carries no adjusted close"),
    }
    sources.push(("Volume", quote.volume));

    let rows = chart.timestamp.len();
    if let Some((name, values)) = sources.iter().find(|(_, v)| v.len() != rows) {
        return Err(ProviderError::Malformed(format!(
            "{name} has {} values for {rows} timestamps",
            values.len()
        )));
    }

    let mut index = Vec::with_capacity(rows);
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows); sources.len()];
    let mut dropped = 0usize;
    for (row, ts) in chart.timestamp.iter().enumerate() {
        let date = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| {
                ProviderError::Malformed(format!("timestamp {ts} + offset {offset} out of range"))
            })?
            .date_naive();
        let values: Option<Vec<f64>> = sources.iter().map(|(_, v)| v[row]).collect();
        match values {
            Some(values) if window.contains(date) => {
                index.push(date);
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("[{ticker}] dropped {dropped} incomplete or out-of-window rows");
    }

    Ok(RawTable {
        index,
        columns: sources
            .into_iter()
            .zip(columns)
            .map(|((name, _), values)| RawColumn::new(name, values))
            .collect(),
    })
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HistoricalSeries, PriceDisplay, SeriesColumn};

    // Two New York sessions (gmtoffset -14400) plus one row with a null close.
    const AAPL_HISTORY: &str = r#"{"chart":{"result":[{
        "meta":{"currency":"USD","symbol":"AAPL","regularMarketPrice":150.25,"gmtoffset":-14400},
        "timestamp":[1714570200,1714656600,1714743000],
        "indicators":{
            "quote":[{
                "open":[169.58,172.51,186.65],
                "high":[172.71,173.42,187.00],
                "low":[169.11,170.89,182.66],
                "close":[169.30,173.03,null],
                "volume":[50383100,94214900,163224100]
            }],
            "adjclose":[{"adjclose":[168.25,171.96,182.44]}]
        }}],"error":null}}"#;

    const NOT_FOUND_BODY: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn yahoo(base_url: &str) -> YahooProvider {
        YahooProvider::new(base_url, Duration::from_secs(1)).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_history_rows_use_exchange_local_dates_and_skip_nulls() {
        // Arrange
        let chart = parse_chart(200, AAPL_HISTORY).unwrap().unwrap();

        // Act
        let table = table_from_chart(&ticker("AAPL"), chart, &DateWindow::default()).unwrap();

        // Assert
        assert_eq!(table.index, vec![date(2024, 5, 1), date(2024, 5, 2)]);
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Open", "High", "Low", "Close", "Adj Close", "Volume"]);
        assert_eq!(table.columns[3].values, vec![169.30, 173.03]);
        assert_eq!(table.columns[5].values, vec![50383100.0, 94214900.0]);
    }

    #[test]
    fn test_rows_outside_window_are_dropped() {
        let chart = parse_chart(200, AAPL_HISTORY).unwrap().unwrap();
        let window = DateWindow::new(date(2024, 5, 2), date(2024, 6, 1)).unwrap();

        let table = table_from_chart(&ticker("AAPL"), chart, &window).unwrap();

        assert_eq!(table.index, vec![date(2024, 5, 2)]);
    }

    #[test]
    fn test_history_feeds_positional_rename() {
        let chart = parse_chart(200, AAPL_HISTORY).unwrap().unwrap();
        let table = table_from_chart(&ticker("AAPL"), chart, &DateWindow::default()).unwrap();

        let series = HistoricalSeries::from_raw(ticker("AAPL"), table).unwrap();

        assert_eq!(series.column(SeriesColumn::AdjClose), &[168.25, 171.96]);
    }

    #[test]
    fn test_missing_adjusted_close_is_rejected_by_rename() {
        let body = AAPL_HISTORY.replace(
            r#""adjclose":[{"adjclose":[168.25,171.96,182.44]}]"#,
            r#""adjclose":[]"#,
        );
        let chart = parse_chart(200, &body).unwrap().unwrap();
        let table = table_from_chart(&ticker("AAPL"), chart, &DateWindow::default()).unwrap();
        assert_eq!(table.columns.len(), 5);

        let result = HistoricalSeries::from_raw(ticker("AAPL"), table);

        assert!(matches!(result, Err(ProviderError::Schema(_))));
    }

    #[test]
    fn test_ragged_indicator_is_malformed() {
        let body = AAPL_HISTORY.replace("[50383100,94214900,163224100]", "[50383100]");
        let chart = parse_chart(200, &body).unwrap().unwrap();

        let result = table_from_chart(&ticker("AAPL"), chart, &DateWindow::default());

        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_unknown_symbol_is_empty_not_error() {
        let chart = parse_chart(404, NOT_FOUND_BODY).unwrap();
        assert!(chart.is_none());
        assert!(snapshot_from_chart(chart).is_empty());
    }

    #[test]
    fn test_snapshot_maps_market_price_to_current_price() {
        let chart = parse_chart(200, AAPL_HISTORY).unwrap();

        let snapshot = snapshot_from_chart(chart);

        assert_eq!(snapshot.current_price(), PriceDisplay::Price(150.25));
        assert_eq!(snapshot.get("currency"), Some(&Value::from("USD")));
    }

    #[test]
    fn test_snapshot_without_market_price_is_not_available() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"XYZ"}}],"error":null}}"#;
        let snapshot = snapshot_from_chart(parse_chart(200, body).unwrap());
        assert_eq!(snapshot.current_price(), PriceDisplay::NotAvailable);
    }

    #[test]
    fn test_non_json_error_body_becomes_status_error() {
        let result = parse_chart(429, "Too Many Requests");
        match result {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "Too Many Requests");
            }
            other => panic!("Expected a Status error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_chart_errors_are_surfaced() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let result = parse_chart(400, body);
        assert!(matches!(result, Err(ProviderError::Status { status: 400, .. })));
    }

    #[test]
    fn test_garbage_success_body_is_json_error() {
        assert!(matches!(parse_chart(200, "<html>"), Err(ProviderError::Json(_))));
    }

    #[test]
    fn test_urls_cover_window_with_utc_midnights() {
        let provider = yahoo("https://query1.finance.yahoo.com/");

        let url = provider.history_url(&ticker("aapl"), &DateWindow::default());

        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/AAPL?period1=1714521600&period2=1727740800&interval=1d&events=div%7Csplit&includeAdjustedClose=true"
        );
        let snapshot = provider.snapshot_url(&ticker("msft"));
        assert!(snapshot.as_str().ends_with("/chart/MSFT?range=1d&interval=1d"));
    }

    #[test]
    fn test_fragment_character_in_symbol_stays_in_path() {
        // Arrange
        let provider = yahoo("https://query1.finance.yahoo.com");

        // Act
        let url = provider.history_url(&ticker("ZZZ#AAPL"), &DateWindow::default());

        // Assert
        assert_eq!(url.path(), "/v8/finance/chart/ZZZ%23AAPL");
        assert_eq!(url.fragment(), None);
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, ["period1", "period2", "interval", "events", "includeAdjustedClose"]);
    }

    #[test]
    fn test_query_characters_in_symbol_cannot_rewrite_query() {
        let provider = yahoo("https://query1.finance.yahoo.com");

        let url = provider.snapshot_url(&ticker("AAPL?range=max&x"));

        assert_eq!(url.path(), "/v8/finance/chart/AAPL%3FRANGE=MAX&X");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("range".to_string(), "1d".to_string()),
                ("interval".to_string(), "1d".to_string())
            ]
        );
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        let provider = yahoo("http://127.0.0.1:8080/proxy/");

        let url = provider.snapshot_url(&ticker("KO"));

        assert_eq!(url.path(), "/proxy/v8/finance/chart/KO");
    }

    #[test]
    fn test_unusable_base_url_is_rejected() {
        let relative = YahooProvider::new("query1.finance.yahoo.com", Duration::from_secs(1));
        let opaque = YahooProvider::new("mailto:quotes@example.com", Duration::from_secs(1));

        assert!(matches!(relative, Err(ProviderError::BaseUrl(_))));
        assert!(matches!(opaque, Err(ProviderError::BaseUrl(_))));
    }

    #[test]
    fn test_overflowing_timestamp_is_malformed_not_a_panic() {
        // Arrange
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":100},
            "timestamp":[9223372036854775800],
            "indicators":{
                "quote":[{"open":[1.0],"high":[1.0],"low":[1.0],"close":[1.0],"volume":[1.0]}],
                "adjclose":[{"adjclose":[1.0]}]
            }}],"error":null}}"#;
        let chart = parse_chart(200, body).unwrap().unwrap();

        // Act
        let result = table_from_chart(&ticker("AAPL"), chart, &DateWindow::default());

        // Assert
        match result {
            Err(ProviderError::Malformed(msg)) => assert!(msg.contains("9223372036854775800")),
            other => panic!("Expected a Malformed error, got {other:?}"),
        }
    }
}
