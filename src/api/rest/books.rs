//! Book endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResult, DeleteResponse, JsonBody, PathParam, QueryParams};
use crate::api::state::AppState;
use crate::types::{Book, BookPatch, NewBook, SearchCriteria};

/// GET /books?title=..&author=..&genre=..
///
/// No parameters lists every book. No match is a 404.
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    QueryParams(criteria): QueryParams<SearchCriteria>,
) -> ApiResult<Json<Vec<Book>>> {
    let stores = &state.stores;
    Ok(Json(stores.books.search(&state.context(), &criteria, &stores.authors)?))
}

/// POST /books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    JsonBody(book): JsonBody<NewBook>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let stores = &state.stores;
    let created = stores.books.create(&state.context(), book, &stores.authors)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<Book>> {
    let stores = &state.stores;
    Ok(Json(stores.books.get(&state.context(), id, &stores.authors)?))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
    JsonBody(patch): JsonBody<BookPatch>,
) -> ApiResult<Json<Book>> {
    let stores = &state.stores;
    let updated = stores
        .books
        .update(&state.context(), id, patch, &stores.authors)?;
    Ok(Json(updated))
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<DeleteResponse>> {
    state.stores.books.delete(&state.context(), id)?;
    Ok(DeleteResponse::success())
}
