use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{error::AppResult, models::Category, serializers, AppState};

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let start = Instant::now();
    let categories = state.categories.list().await?;

    info!(
        count = categories.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed categories"
    );

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(body) = payload?;
    let fields = serializers::validate_category(&body)?;

    let start = Instant::now();
    let category = state.categories.insert(&fields).await?;

    info!(
        id = category.id,
        name = %category.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Created category"
    );

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = path?;
    let category = state.categories.get(id).await?;
    info!(id, "Fetched category");
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = path?;
    state.categories.get(id).await?;
    let Json(body) = payload?;
    let fields = serializers::validate_category(&body)?;

    let category = state.categories.update(id, &fields).await?;
    info!(id, "Updated category");
    Ok(Json(category))
}

pub async fn partial_update_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Category>> {
    let Path(id) = path?;
    let existing = state.categories.get(id).await?;
    let Json(body) = payload?;
    let fields = serializers::validate_category_patch(&body, &existing)?;

    let category = state.categories.update(id, &fields).await?;
    info!(id, "Partially updated category");
    Ok(Json(category))
}

/// Also removes the category's products.
pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    state.categories.delete(id).await?;
    info!(id, "Deleted category");
    Ok(StatusCode::NO_CONTENT)
}
