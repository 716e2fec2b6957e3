//! Author endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResult, DeleteResponse, JsonBody, PathParam};
use crate::api::state::AppState;
use crate::types::{Author, AuthorPatch, NewAuthor};

/// GET /authors
pub async fn list_authors(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Author>>> {
    let authors = state.stores.authors.list(&state.context())?;
    Ok(Json(authors))
}

/// POST /authors
pub async fn create_author(
    State(state): State<Arc<AppState>>,
    JsonBody(author): JsonBody<NewAuthor>,
) -> ApiResult<(StatusCode, Json<Author>)> {
    let created = state.stores.authors.create(&state.context(), author)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /authors/:id
pub async fn get_author(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.stores.authors.get(&state.context(), id)?))
}

/// PUT /authors/:id
pub async fn update_author(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
    JsonBody(patch): JsonBody<AuthorPatch>,
) -> ApiResult<Json<Author>> {
    Ok(Json(state.stores.authors.update(&state.context(), id, patch)?))
}

/// DELETE /authors/:id - refused while any book references the author
pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<u64>,
) -> ApiResult<Json<DeleteResponse>> {
    let stores = &state.stores;
    stores.authors.delete(&state.context(), id, &stores.books)?;
    Ok(DeleteResponse::success())
}
