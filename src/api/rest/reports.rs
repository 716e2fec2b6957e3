//! Sales report endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResult, QueryParams};
use crate::api::state::AppState;
use crate::reports::list_reports;
use crate::types::SalesReport;
use crate::utils::parse_calendar_date;

/// Inclusive calendar-date range, `YYYY-MM-DD`
#[derive(Debug, Deserialize)]
pub struct ReportRangeParams {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// GET /reports?start_date=..&end_date=..
pub async fn list_sales_reports(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<ReportRangeParams>,
) -> ApiResult<Json<Vec<SalesReport>>> {
    let start = parse_calendar_date(&params.start_date)?;
    let end = parse_calendar_date(&params.end_date)?;

    let reports = list_reports(&state.reports_dir, start, end)?;
    if reports.is_empty() {
        return Err(ApiError::not_found(format!(
            "no reports found between {} and {}",
            start, end
        )));
    }
    Ok(Json(reports))
}
