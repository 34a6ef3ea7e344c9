//! Invalidation Endpoint
//!
//! The receiving side of a broadcast. Evictions are applied before the
//! response is sent, so a 2xx means this replica's entry is gone.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use crate::api::AppState;
use crate::error::Result;
use crate::models::{EvictQuery, EvictResponse};

/// Handler for DELETE /caches/:cache_name[?key=...]
///
/// With a key only that entry is evicted; without one (or with an empty
/// one) the whole cache is cleared. Unknown caches answer 404.
pub async fn evict_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
    Query(query): Query<EvictQuery>,
) -> Result<Json<EvictResponse>> {
    match query.key.filter(|key| !key.is_empty()) {
        Some(key) => {
            let removed = state.cache.evict(&cache_name, &key).await?;
            debug!("Peer eviction of {}[{}] (removed={})", cache_name, key, removed);
            Ok(Json(EvictResponse::key(cache_name, key, removed)))
        }
        None => {
            let removed = state.cache.evict_all(&cache_name).await?;
            Ok(Json(EvictResponse::cache(cache_name, removed)))
        }
    }
}

/// Handler for DELETE /caches
///
/// Clears every configured cache.
pub async fn evict_every_cache_handler(State(state): State<AppState>) -> Json<EvictResponse> {
    Json(EvictResponse::all(state.cache.evict_every_cache().await))
}
