//! REST endpoints
//!
//! - `/authors`, `/authors/:id`
//! - `/books`, `/books/:id` (GET `/books` searches by `title`, `author`, `genre`)
//! - `/customers`, `/customers/:id`
//! - `/orders`, `/orders/:id`, `/orders/history`, `/orders/timerange`
//! - `/reports?start_date=..&end_date=..`

pub mod authors;
pub mod books;
pub mod customers;
pub mod orders;
pub mod reports;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.to_string(),
            status,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound(_) => Self::not_found(message),
            StoreError::Conflict(_) => Self::conflict(message),
            StoreError::InsufficientStock { .. } => {
                Self::new(StatusCode::CONFLICT, "INSUFFICIENT_STOCK", message)
            }
            StoreError::InvalidInput(_) => Self::bad_request(message),
            StoreError::Cancelled => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "CANCELLED", message)
            }
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Config(_) => {
                error!(error = %message, "request failed");
                Self::internal(message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// JSON request body; malformed input answers with an [`ApiError`] body
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters, rejected as an [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Path parameters, rejected as an [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// Body returned by every successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub result: &'static str,
}

impl DeleteResponse {
    pub fn success() -> Json<Self> {
        Json(Self { result: "success" })
    }
}
