//! Product handlers

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use catalog_core::{Product, ProductFields, Sourced};
use tracing::debug;

/// Ids the store could never have assigned cannot match a row.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| {
        debug!("Rejecting non-numeric product id {:?}", raw);
        ApiError::NotFound
    })
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sourced<Product>>, ApiError> {
    let id = parse_id(&id)?;

    match state.products.get_by_id(id).await? {
        Some(product) => {
            debug!("Served product {} from {}", id, product.source);
            Ok(Json(product))
        }
        None => Err(ApiError::NotFound),
    }
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ProductFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(fields) = body?;
    let product = state.products.create(fields).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ProductFields>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let Json(fields) = body?;

    match state.products.update(id, fields).await? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound),
    }
}
