//! Sales reports
//!
//! - `generator`: one aggregation pass over recent orders, written to a dated file
//! - `scheduler`: background thread running the generator on a tick
//! - `archive`: reading written reports back by date range

mod archive;
mod generator;
mod scheduler;

pub use archive::list_reports;
pub use generator::{generate_sales_report, run_report_tick, write_report};
pub use scheduler::ReportScheduler;
