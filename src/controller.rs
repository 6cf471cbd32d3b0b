// src/controller.rs

use log::{info, warn};
use std::mem;

use crate::error::TrackerError;
use crate::pipeline::{self, Fetched, ViewState};
use crate::provider::MarketDataProvider;
use crate::types::{DateWindow, Ticker};
use crate::worker::{FetchReport, FetchWorker, JobId};

/// Where the controller is in a submit cycle. Both outcomes return to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching { job: JobId, ticker: Ticker },
}

/// How the last finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    Failed,
}

/// A blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl From<&TrackerError> for Alert {
    fn from(err: &TrackerError) -> Self {
        Self {
            title: err.alert_title(),
            message: err.to_string(),
        }
    }
}

/// Owns all state the GUI shows: the mounted charts, the price label and any
/// pending alert.
#[derive(Debug)]
pub struct Controller {
    view: ViewState,
    price_text: String,
    alert: Option<Alert>,
    phase: Phase,
    last_outcome: Option<Outcome>,
    next_panel_id: u64,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            view: ViewState::default(),
            price_text: String::new(),
            alert: None,
            phase: Phase::Idle,
            last_outcome: None,
            next_panel_id: 0,
        }
    }

    /// Runs the whole pipeline on the calling thread.
    pub fn submit<P>(
        &mut self,
        provider: &P,
        window: &DateWindow,
        input: &str,
    ) -> Result<(), TrackerError>
    where
        P: MarketDataProvider + ?Sized,
    {
        let result = Ticker::parse(input)
            .and_then(|ticker| pipeline::fetch(provider, &ticker, window))
            .and_then(|fetched| self.apply(fetched));
        self.settle(result)
    }

    /// Validates the input here and hands the fetch to `worker`.
    /// An empty input never reaches the worker.
    pub fn dispatch(&mut self, worker: &FetchWorker, input: &str) -> Result<JobId, TrackerError> {
        let ticker = match Ticker::parse(input) {
            Ok(ticker) => ticker,
            Err(err) => return Err(self.fail(err)),
        };
        let job = worker.request(ticker.clone());
        info!("[{ticker}] queued as job {job}");
        self.phase = Phase::Fetching { job, ticker };
        Ok(job)
    }

    /// Applies a worker report. Returns `None` when the report belongs to a
    /// request that has since been replaced.
    pub fn complete(&mut self, report: FetchReport) -> Option<Result<(), TrackerError>> {
        match &self.phase {
            Phase::Fetching { job, .. } if *job == report.job => {}
            _ => {
                info!("ignoring report for superseded job {}", report.job);
                return None;
            }
        }
        let result = report.outcome.and_then(|fetched| self.apply(fetched));
        Some(self.settle(result))
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, Phase::Fetching { .. })
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    // Steps 5-8: clear, render, mount, then update the price label.
    fn apply(&mut self, fetched: Fetched) -> Result<(), TrackerError> {
        let previous = mem::take(&mut self.view);
        self.view = pipeline::render(previous, &fetched.series, &mut self.next_panel_id)?;
        self.price_text = format!("Current Price: {}", fetched.price);
        info!("[{}] rendered, {}", fetched.ticker, self.price_text);
        Ok(())
    }

    fn settle(&mut self, result: Result<(), TrackerError>) -> Result<(), TrackerError> {
        self.phase = Phase::Idle;
        match result {
            Ok(()) => {
                self.last_outcome = Some(Outcome::Rendered);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: TrackerError) -> TrackerError {
        warn!("{err}");
        self.alert = Some(Alert::from(&err));
        self.last_outcome = Some(Outcome::Failed);
        err
    }
}
