//! Configuration for the bookstore server
//!
//! Centralized configuration with sensible defaults, overridable from the
//! environment at startup.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

/// Main configuration for a bookstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------
    /// Directory holding one snapshot file per store
    ///   {data_dir}/
    ///     ├── authors.json
    ///     ├── books.json
    ///     ├── customers.json
    ///     └── orders.json
    pub data_dir: PathBuf,

    /// Directory the report generator writes `report_<date>.json` files into
    pub reports_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------
    /// How often the report job wakes up
    pub report_tick: Duration,

    /// Trailing span of orders aggregated by each report
    pub report_window: Duration,

    // -------------------------------------------------------------------------
    // Network
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("database"),
            reports_dir: PathBuf::from("output-reports"),
            report_tick: Duration::from_secs(60),
            report_window: Duration::from_secs(3 * 60 * 60),
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub const DATA_DIR_VAR: &'static str = "BOOKSTORE_DATA_DIR";
    pub const REPORTS_DIR_VAR: &'static str = "BOOKSTORE_REPORTS_DIR";
    pub const LISTEN_ADDR_VAR: &'static str = "BOOKSTORE_LISTEN_ADDR";
    pub const REPORT_TICK_VAR: &'static str = "BOOKSTORE_REPORT_TICK_SECS";
    pub const REPORT_WINDOW_VAR: &'static str = "BOOKSTORE_REPORT_WINDOW_SECS";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Build a config from `BOOKSTORE_*` environment variables
    ///
    /// Unset variables keep their defaults. Relative directories resolve
    /// against the current working directory.
    pub fn from_env() -> StoreResult<Self> {
        let mut config = Config::default();
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        if let Ok(dir) = env::var(Self::DATA_DIR_VAR) {
            config.data_dir = resolve_dir(&current_dir, &dir);
        }
        if let Ok(dir) = env::var(Self::REPORTS_DIR_VAR) {
            config.reports_dir = resolve_dir(&current_dir, &dir);
        }
        if let Ok(addr) = env::var(Self::LISTEN_ADDR_VAR) {
            config.listen_addr = addr;
        }
        if let Some(secs) = read_secs(Self::REPORT_TICK_VAR)? {
            config.report_tick = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs(Self::REPORT_WINDOW_VAR)? {
            config.report_window = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the report scheduler cannot run with
    pub fn validate(&self) -> StoreResult<()> {
        if self.report_tick.is_zero() {
            return Err(StoreError::Config("report tick must be positive".to_string()));
        }
        if self.report_window.is_zero() {
            return Err(StoreError::Config("report window must be positive".to_string()));
        }
        Ok(())
    }
}

fn resolve_dir(current_dir: &Path, dir: &str) -> PathBuf {
    if Path::new(dir).is_absolute() {
        PathBuf::from(dir)
    } else {
        current_dir.join(dir)
    }
}

fn read_secs(var: &str) -> StoreResult<Option<u64>> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| StoreError::Config(format!("{} must be a number of seconds: {}", var, e))),
        Err(_) => Ok(None),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn reports_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.reports_dir = path.into();
        self
    }

    /// Set the report tick cadence
    pub fn report_tick(mut self, tick: Duration) -> Self {
        self.config.report_tick = tick;
        self
    }

    /// Set the aggregation window (independent of the tick)
    pub fn report_window(mut self, window: Duration) -> Self {
        self.config.report_window = window;
        self
    }

    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
