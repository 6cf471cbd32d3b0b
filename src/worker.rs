// src/worker.rs

//! Runs fetches off the GUI thread.
//!
//! One background thread drains a job queue. Each request gets a larger
//! [`JobId`] than the last; a job that has been overtaken by a newer request
//! is skipped before it starts, and its result is dropped if it finishes late.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::TrackerError;
use crate::pipeline::{self, Fetched};
use crate::provider::MarketDataProvider;
use crate::types::{DateWindow, Ticker};

pub type JobId = u64;

/// Result of one fetch, tagged with the request that produced it.
#[derive(Debug)]
pub struct FetchReport {
    pub job: JobId,
    pub outcome: Result<Fetched, TrackerError>,
}

struct FetchJob {
    id: JobId,
    ticker: Ticker,
}

pub struct FetchWorker {
    jobs: Option<Sender<FetchJob>>,
    reports: Receiver<FetchReport>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl FetchWorker {
    /// Starts the worker thread. `notify` runs after every delivered report,
    /// typically to wake the GUI.
    pub fn spawn<F>(provider: Arc<dyn MarketDataProvider>, window: DateWindow, notify: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (job_tx, job_rx) = unbounded::<FetchJob>();
        let (report_tx, report_rx) = unbounded::<FetchReport>();
        let latest = Arc::new(AtomicU64::new(0));

        let handle = {
            let latest = Arc::clone(&latest);
            thread::spawn(move || {
                for job in job_rx.iter() {
                    if job.id < latest.load(Ordering::SeqCst) {
                        debug!("[{}] job {} superseded before start", job.ticker, job.id);
                        continue;
                    }
                    let outcome = pipeline::fetch(provider.as_ref(), &job.ticker, &window);
                    if job.id < latest.load(Ordering::SeqCst) {
                        debug!("[{}] job {} superseded, dropping result", job.ticker, job.id);
                        continue;
                    }
                    if report_tx.send(FetchReport { job: job.id, outcome }).is_err() {
                        break;
                    }
                    notify();
                }
                debug!("fetch worker stopped");
            })
        };

        Self {
            jobs: Some(job_tx),
            reports: report_rx,
            latest,
            handle: Some(handle),
        }
    }

    /// Queues a fetch and supersedes every earlier request.
    pub fn request(&self, ticker: Ticker) -> JobId {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let sent = self
            .jobs
            .as_ref()
            .map(|jobs| jobs.send(FetchJob { id, ticker }).is_ok())
            .unwrap_or(false);
        if !sent {
            error!("fetch worker is not running; job {id} was not queued");
        }
        id
    }

    /// Id of the most recent request, 0 before the first one.
    pub fn latest_job(&self) -> JobId {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn try_recv(&self) -> Option<FetchReport> {
        self.reports.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchReport> {
        match self.reports.recv_timeout(timeout) {
            Ok(report) => Some(report),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Same as dropping the worker, spelled out at call sites that wait on it.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for FetchWorker {
    // Closes the queue, marks every queued job as superseded and waits for the
    // in-flight one. A running HTTP call still ends at the client timeout.
    fn drop(&mut self) {
        self.jobs.take();
        self.latest.store(JobId::MAX, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("fetch worker panicked");
            }
        }
    }
}
