//! HTTP API
//!
//! Thin axum handlers over the stores and the report archive. All business
//! rules live in the stores; handlers only extract, forward and map errors.

pub mod http;
pub mod rest;
pub mod state;

pub use http::create_router;
pub use state::AppState;
