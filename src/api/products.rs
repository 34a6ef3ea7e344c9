//! Product Handlers
//!
//! Thin CRUD surface; writes go through [`ProductService`](crate::products::ProductService)
//! which takes care of invalidation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::api::AppState;
use crate::error::{CacheError, Result};
use crate::models::ProductRequest;
use crate::products::Product;

/// Handler for GET /api/products
pub async fn list_products_handler(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.products.list().await)
}

/// Handler for GET /api/products/:id (read-through cached)
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Product>> {
    Ok(Json(state.products.get(id).await?))
}

/// Handler for POST /api/products
pub async fn create_product_handler(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let product = state.products.create(req).await;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for PUT /api/products/:id
///
/// Evicts locally and starts the peer broadcast before answering.
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    info!("Updating product {}", id);
    Ok(Json(state.products.update(id, req).await?))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
