//! Shared application state for request handlers

use std::path::PathBuf;

use crate::config::Config;
use crate::context::Context;
use crate::stores::Stores;

/// Stores plus the bits of configuration handlers need
#[derive(Debug, Clone)]
pub struct AppState {
    pub stores: Stores,

    /// Where the report scheduler writes `report_<date>.json` files
    pub reports_dir: PathBuf,
}

impl AppState {
    pub fn new(stores: Stores, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            stores,
            reports_dir: reports_dir.into(),
        }
    }

    pub fn from_config(stores: Stores, config: &Config) -> Self {
        Self::new(stores, config.reports_dir.clone())
    }

    /// Context for a single request
    pub fn context(&self) -> Context {
        Context::new()
    }
}
