//! API Handlers
//!
//! Shared application state plus the administrative handlers: manual sync
//! triggers, local clear, discovery info, stats and health.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::CacheManager;
use crate::config::{Config, DiscoveryConfig};
use crate::discovery::{DnsPeerDirectory, PeerDirectory, StaticPeerDirectory};
use crate::error::{CacheError, Result};
use crate::models::{
    CacheStatsResponse, HealthResponse, InfoResponse, LocalClearResponse, SyncResponse,
};
use crate::products::{Product, ProductRepository, ProductService, PRODUCTS_CACHE};
use crate::sync::InvalidationDispatcher;

/// Application state shared across all handlers.
///
/// Every collaborator is built once at startup and shared through `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager<Product>>,
    pub dispatcher: Arc<InvalidationDispatcher>,
    pub products: Arc<ProductService>,
}

impl AppState {
    /// Wires the product service on top of the given cache and dispatcher.
    pub fn new(
        cache: Arc<CacheManager<Product>>,
        dispatcher: Arc<InvalidationDispatcher>,
        repository: ProductRepository,
    ) -> Self {
        let products = Arc::new(ProductService::new(
            repository,
            Arc::clone(&cache),
            Arc::clone(&dispatcher),
        ));
        Self {
            cache,
            dispatcher,
            products,
        }
    }

    /// Creates the application state from configuration.
    ///
    /// The `products` cache is always present since the product routes use it.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut names = config.cache_names.clone();
        if !names.iter().any(|name| name == PRODUCTS_CACHE) {
            names.push(PRODUCTS_CACHE.to_string());
        }
        let cache = CacheManager::shared(names, config.cache_settings());

        let directory: Arc<dyn PeerDirectory> = match &config.discovery {
            DiscoveryConfig::Static { peers } => Arc::new(
                StaticPeerDirectory::new().with_service(config.service_name.clone(), peers.clone()),
            ),
            DiscoveryConfig::Dns { host, port } => {
                let directory = DnsPeerDirectory::new(*port);
                Arc::new(match host {
                    Some(host) => directory.with_host(host.clone()),
                    None => directory,
                })
            }
        };
        let dispatcher = Arc::new(InvalidationDispatcher::new(
            directory,
            config.service_name.clone(),
            config.sync_timeout(),
        )?);

        Ok(Self::new(cache, dispatcher, ProductRepository::seeded().await))
    }
}

/// Handler for DELETE /api/cache/sync/:cache_name
///
/// Clears `cache_name` on every replica and reports the per-peer outcome.
pub async fn sync_cache_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<SyncResponse>> {
    info!("Triggering cache sync for '{}'", cache_name);
    if !state.cache.contains(&cache_name) {
        return Err(CacheError::CacheNotFound(cache_name));
    }

    let summary = state.dispatcher.broadcast_evict_all(&cache_name).await?;

    Ok(Json(SyncResponse::new(
        format!("Cache sync triggered for: {}", cache_name),
        Some(cache_name),
        summary,
    )))
}

/// Handler for DELETE /api/cache/sync
///
/// Clears every cache on every replica.
pub async fn sync_all_handler(State(state): State<AppState>) -> Result<Json<SyncResponse>> {
    info!("Triggering sync for all caches");
    let summary = state.dispatcher.broadcast_evict_every_cache().await?;

    Ok(Json(SyncResponse::new("All caches sync triggered", None, summary)))
}

/// Handler for DELETE /api/cache/local/:cache_name
///
/// Clears the cache on this replica only.
pub async fn clear_local_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<LocalClearResponse>> {
    let removed = state.cache.evict_all(&cache_name).await?;
    Ok(Json(LocalClearResponse::new(cache_name, removed)))
}

/// Handler for GET /api/cache/info
///
/// Current directory snapshot and configured cache names.
pub async fn info_handler(State(state): State<AppState>) -> Result<Json<InfoResponse>> {
    let peers = state.dispatcher.peers().await?;

    Ok(Json(InfoResponse::new(
        state.dispatcher.service(),
        peers,
        state.cache.names(),
    )))
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, CacheStatsResponse>> {
    let stats: BTreeMap<String, CacheStatsResponse> = state
        .cache
        .stats()
        .await
        .into_iter()
        .map(|(name, stats)| (name, stats.into()))
        .collect();

    Json(stats)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
