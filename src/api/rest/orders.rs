//! Order endpoints

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{ApiResult, DeleteResponse, JsonBody, PathParam, QueryParams};
use crate::api::state::AppState;
use crate::types::{NewOrder, Order, OrderPatch};
use crate::utils::parse_timestamp;

/// Query parameters for `/orders/timerange`, RFC 3339 timestamps
#[derive(Debug, Deserialize)]
pub struct TimeRangeParams {
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    #[serde(rename = "endTime", default)]
    pub end_time: String,
}

pub async fn list_orders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.stores.orders.list(&state.context())?))
}

/// POST /orders - reserves stock; total and timestamps are set server-side
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    JsonBody(order): JsonBody<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let stores = &state.stores;
    let created =
        stores
            .orders
            .create(&state.context(), order, &stores.customers, &stores.books)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.stores.orders.get(&state.context(), id)?))
}

pub async fn update_order(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
    JsonBody(patch): JsonBody<OrderPatch>,
) -> ApiResult<Json<Order>> {
    let stores = &state.stores;
    let updated = stores
        .orders
        .update(&state.context(), id, patch, &stores.books)?;
    Ok(Json(updated))
}

pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<DeleteResponse>> {
    state.stores.orders.delete(&state.context(), id)?;
    Ok(DeleteResponse::success())
}

/// GET /orders/history - order id to creation time
pub async fn order_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<u64, DateTime<Utc>>>> {
    Ok(Json(state.stores.orders.view_history(&state.context())?))
}

/// GET /orders/timerange?startTime=..&endTime=..
pub async fn orders_in_range(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<TimeRangeParams>,
) -> ApiResult<Json<Vec<Order>>> {
    let start = parse_timestamp(&params.start_time)?;
    let end = parse_timestamp(&params.end_time)?;
    let orders = state
        .stores
        .orders
        .fetch_within_time_range(&state.context(), start, end)?;
    Ok(Json(orders))
}
