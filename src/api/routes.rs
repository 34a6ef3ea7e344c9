//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_local_handler, health_handler, info_handler, stats_handler, sync_all_handler,
    sync_cache_handler, AppState,
};
use super::invalidation::{evict_every_cache_handler, evict_handler};
use super::products::{
    create_product_handler, delete_product_handler, get_product_handler, list_products_handler,
    update_product_handler,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `DELETE /caches` - Clear every local cache (peer wire call)
/// - `DELETE /caches/:cache_name[?key=]` - Evict locally (peer wire call)
/// - `DELETE /api/cache/sync` - Broadcast a clear of every cache
/// - `DELETE /api/cache/sync/:cache_name` - Broadcast a clear of one cache
/// - `DELETE /api/cache/local/:cache_name` - Clear one cache on this replica
/// - `GET /api/cache/info` - Discovered peers and cache names
/// - `GET /api/cache/stats` - Per-cache statistics
/// - `GET|POST /api/products`, `GET|PUT|DELETE /api/products/:id`
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/caches", delete(evict_every_cache_handler))
        .route("/caches/:cache_name", delete(evict_handler))
        .route("/api/cache/sync", delete(sync_all_handler))
        .route("/api/cache/sync/:cache_name", delete(sync_cache_handler))
        .route("/api/cache/local/:cache_name", delete(clear_local_handler))
        .route("/api/cache/info", get(info_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route(
            "/api/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route(
            "/api/products/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
