//! Error types for the cache sync service
//!
//! Provides unified error handling using thiserror. Per-peer dispatch
//! failures are not errors; see [`DispatchOutcome`](crate::sync::DispatchOutcome).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
#[derive(Error, Debug)]
pub enum CacheError {
    /// The named cache is not configured on this replica
    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    /// No product with this id in the backing store
    #[error("Product not found: {0}")]
    ProductNotFound(u64),

    /// The peer directory could not be queried
    #[error("Peer directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    pub fn status(&self) -> StatusCode {
        match self {
            CacheError::CacheNotFound(_) | CacheError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::DirectoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache sync service.
pub type Result<T> = std::result::Result<T, CacheError>;
