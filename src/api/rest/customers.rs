//! Customer endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResult, DeleteResponse, JsonBody, PathParam};
use crate::api::state::AppState;
use crate::types::{Customer, CustomerPatch, NewCustomer};

pub async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.stores.customers.list(&state.context())?))
}

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    JsonBody(customer): JsonBody<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let created = state.stores.customers.create(&state.context(), customer)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.stores.customers.get(&state.context(), id)?))
}

pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
    JsonBody(patch): JsonBody<CustomerPatch>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.stores.customers.update(&state.context(), id, patch)?))
}

/// DELETE /customers/:id - refused while any order references the customer
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<DeleteResponse>> {
    let stores = &state.stores;
    stores.customers.delete(&state.context(), id, &stores.orders)?;
    Ok(DeleteResponse::success())
}
