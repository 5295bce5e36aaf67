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

use crate::{error::AppResult, models::Product, serializers, AppState};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let start = Instant::now();
    let products = state.products.list().await?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok(Json(products))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(body) = payload?;
    let fields = serializers::validate_product(&body, state.categories.as_ref()).await?;

    let start = Instant::now();
    let product = state.products.insert(&fields).await?;

    info!(
        id = product.id,
        name = %product.name,
        category_id = product.category.id,
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = path?;
    let product = state.products.get(id).await?;
    info!(id, "Fetched product");
    Ok(Json(product))
}

// ── Update ────────────────────────────────────────────────────────────────────

/// PUT: every writable field must be sent.
pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = path?;
    state.products.get(id).await?;
    let Json(body) = payload?;
    let fields = serializers::validate_product(&body, state.categories.as_ref()).await?;

    let product = state.products.update(id, &fields).await?;
    info!(id, "Updated product");
    Ok(Json(product))
}

/// PATCH: only the fields sent are changed.
pub async fn partial_update_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = path?;
    let existing = state.products.get(id).await?;
    let Json(body) = payload?;
    let fields =
        serializers::validate_product_patch(&body, state.categories.as_ref(), &existing).await?;

    let product = state.products.update(id, &fields).await?;
    info!(id, "Partially updated product");
    Ok(Json(product))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    state.products.delete(id).await?;
    info!(id, "Deleted product");
    Ok(StatusCode::NO_CONTENT)
}
