// src/pipeline.rs

//! The fetch → transform → render steps, as free functions over explicit state.

use log::{debug, info};

use crate::chart::{ChartGrid, ChartPanel};
use crate::error::TrackerError;
use crate::provider::MarketDataProvider;
use crate::types::{DateWindow, HistoricalSeries, PriceDisplay, Ticker};

/// Everything pulled from the provider for one ticker, ready to render.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub ticker: Ticker,
    pub price: PriceDisplay,
    pub series: HistoricalSeries,
}

/// Asks the provider for the quote and the history, then relabels the columns.
///
/// An empty history is [`TrackerError::NoData`]. A missing price is not an error.
pub fn fetch<P>(provider: &P, ticker: &Ticker, window: &DateWindow) -> Result<Fetched, TrackerError>
where
    P: MarketDataProvider + ?Sized,
{
    info!("[{ticker}] fetching quote and history for {window}");
    let price = provider.quote_snapshot(ticker)?.current_price();

    let raw = provider.historical_series(ticker, window)?;
    if raw.is_empty() {
        return Err(TrackerError::NoData(ticker.to_string()));
    }
    debug!("[{ticker}] {} rows, {} columns", raw.len(), raw.columns.len());

    let series = HistoricalSeries::from_raw(ticker.clone(), raw)?;
    Ok(Fetched {
        ticker: ticker.clone(),
        price,
        series,
    })
}

/// A chart panel currently on screen.
#[derive(Debug, Clone)]
pub struct MountedPanel {
    /// Unique across the life of the owning controller.
    pub id: u64,
    pub panel: ChartPanel,
}

/// The chart set currently on screen. At most one set exists at a time.
#[derive(Debug, Default)]
pub struct ViewState {
    ticker: Option<Ticker>,
    panels: Vec<MountedPanel>,
}

impl ViewState {
    fn mount(ticker: Ticker, grid: ChartGrid, next_id: &mut u64) -> Self {
        let panels = grid
            .panels
            .into_iter()
            .map(|panel| {
                *next_id += 1;
                MountedPanel { id: *next_id, panel }
            })
            .collect();
        Self {
            ticker: Some(ticker),
            panels,
        }
    }

    /// Tears the view down, returning how many panels were removed.
    fn unmount(self) -> usize {
        self.panels.len()
    }

    pub fn ticker(&self) -> Option<&Ticker> {
        self.ticker.as_ref()
    }

    pub fn panels(&self) -> &[MountedPanel] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panel_ids(&self) -> Vec<u64> {
        self.panels.iter().map(|p| p.id).collect()
    }
}

/// Replaces `previous` with a fresh chart set for `series`.
///
/// `previous` is unmounted before the grid is built, so on error the caller
/// is left with nothing on screen.
pub fn render(
    previous: ViewState,
    series: &HistoricalSeries,
    next_id: &mut u64,
) -> Result<ViewState, TrackerError> {
    let removed = previous.unmount();
    debug!("unmounted {removed} panels");

    let grid = ChartGrid::build(series)?;
    let view = ViewState::mount(series.ticker().clone(), grid, next_id);
    debug!("[{}] mounted {} panels", series.ticker(), view.len());
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::fixture::{MockProvider, six_column_table};
    use crate::types::SeriesColumn;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_fetch_returns_price_and_relabelled_series() {
        let provider = MockProvider::aapl(5);

        let fetched = fetch(&provider, &ticker("AAPL"), &DateWindow::default()).unwrap();

        assert_eq!(fetched.price, PriceDisplay::Price(150.25));
        assert_eq!(fetched.series.len(), 5);
        assert_eq!(fetched.series.column(SeriesColumn::Open)[0], 100.0);
        assert_eq!(provider.quote_calls(), 1);
        assert_eq!(provider.history_calls(), 1);
    }

    #[test]
    fn test_fetch_empty_history_is_no_data() {
        let provider = MockProvider::empty();

        let result = fetch(&provider, &ticker("ZZZZINVALID"), &DateWindow::default());

        match result {
            Err(TrackerError::NoData(symbol)) => assert_eq!(symbol, "ZZZZINVALID"),
            other => panic!("Expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_propagates_provider_failure() {
        let mut provider = MockProvider::aapl(5);
        provider.fail_status = Some(503);

        let result = fetch(&provider, &ticker("AAPL"), &DateWindow::default());

        assert!(matches!(
            result,
            Err(TrackerError::Provider(ProviderError::Status { status: 503, .. }))
        ));
    }

    #[test]
    fn test_render_replaces_previous_panels() {
        // Arrange
        let series = HistoricalSeries::from_raw(ticker("AAPL"), six_column_table(4)).unwrap();
        let mut next_id = 0;
        let first = render(ViewState::default(), &series, &mut next_id).unwrap();
        let first_ids = first.panel_ids();

        // Act
        let second = render(first, &series, &mut next_id).unwrap();

        // Assert
        assert_eq!(second.len(), 6);
        assert!(second.panel_ids().iter().all(|id| !first_ids.contains(id)));
        assert_eq!(second.ticker(), Some(&ticker("AAPL")));
    }
}
