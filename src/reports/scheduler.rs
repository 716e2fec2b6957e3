//! Background report scheduler
//!
//! Runs [`run_report_tick`] on a dedicated thread at a fixed cadence. A failed
//! tick is logged and the next tick runs as usual.

use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use crossbeam::channel::{bounded, tick, Sender};
use crossbeam::select;
use tracing::{error, info};

use crate::config::Config;
use crate::context::Context;
use crate::error::StoreResult;
use crate::stores::Stores;

use super::generator::run_report_tick;

const THREAD_NAME: &str = "report-scheduler";

/// Handle to the running scheduler thread
///
/// Dropping the handle stops the thread as well; [`ReportScheduler::shutdown`]
/// does the same but makes the join point explicit.
#[derive(Debug)]
pub struct ReportScheduler {
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReportScheduler {
    /// Start ticking every `config.report_tick`, aggregating `config.report_window`
    pub fn spawn(stores: Stores, config: &Config) -> StoreResult<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let every = config.report_tick;
        let window = config.report_window;
        let reports_dir = config.reports_dir.clone();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                info!(
                    tick_secs = every.as_secs_f64(),
                    window_secs = window.as_secs(),
                    dir = %reports_dir.display(),
                    "report scheduler started"
                );
                let ticker = tick(every);
                loop {
                    select! {
                        recv(ticker) -> _ => tick_once(&stores, &reports_dir, window),
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                info!("report scheduler stopped");
            })?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for an in-flight tick to finish
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender disconnects the channel and wakes the select
        self.shutdown_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("report scheduler thread panicked");
            }
        }
    }
}

impl Drop for ReportScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick_once(stores: &Stores, reports_dir: &Path, window: Duration) {
    let ctx = Context::background();
    if let Err(e) = run_report_tick(&ctx, stores, reports_dir, window, Utc::now()) {
        error!(error = %e, "sales report tick failed");
    }
}
