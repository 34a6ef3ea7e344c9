//! Shared helpers for integration tests: replicas on ephemeral ports and
//! peer directories the tests can steer.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{routing::delete, Router};
use cache_sync::{
    cache::{CacheManager, CacheSettings},
    create_router,
    discovery::{PeerDirectory, PeerInstance},
    products::{ProductRepository, PRODUCTS_CACHE},
    AppState, CacheError, InvalidationDispatcher, Result,
};
use tokio::net::TcpListener;

pub const SERVICE: &str = "cache-sync";

// == Directories ==

/// Membership list the test can change after replicas are bound.
#[derive(Clone, Default)]
pub struct SharedDirectory {
    peers: Arc<Mutex<Vec<PeerInstance>>>,
}

impl SharedDirectory {
    pub fn add(&self, id: &str, addr: SocketAddr) {
        let peer = PeerInstance::new(id, addr.ip().to_string(), addr.port());
        self.peers.lock().unwrap().push(peer);
    }
}

#[async_trait]
impl PeerDirectory for SharedDirectory {
    async fn list_peers(&self, _service: &str) -> Result<Vec<PeerInstance>> {
        Ok(self.peers.lock().unwrap().clone())
    }
}

/// A membership backend that is down.
pub struct UnavailableDirectory;

#[async_trait]
impl PeerDirectory for UnavailableDirectory {
    async fn list_peers(&self, _service: &str) -> Result<Vec<PeerInstance>> {
        Err(CacheError::DirectoryUnavailable("membership API down".to_string()))
    }
}

// == Servers ==

pub fn dispatcher(directory: Arc<dyn PeerDirectory>, timeout: Duration) -> Arc<InvalidationDispatcher> {
    Arc::new(InvalidationDispatcher::new(directory, SERVICE, timeout).unwrap())
}

/// Starts a full replica and returns its address and state.
pub async fn spawn_replica(directory: Arc<dyn PeerDirectory>) -> (SocketAddr, AppState) {
    let cache = CacheManager::shared([PRODUCTS_CACHE], CacheSettings::default());
    let state = AppState::new(
        cache,
        dispatcher(directory, Duration::from_secs(2)),
        ProductRepository::seeded().await,
    );
    let addr = serve(create_router(state.clone())).await;
    (addr, state)
}

/// Starts a peer whose invalidation endpoint never answers in time.
pub async fn spawn_slow_peer(delay: Duration) -> SocketAddr {
    let slow = move || async move {
        tokio::time::sleep(delay).await;
        "late"
    };
    serve(
        Router::new()
            .route("/caches", delete(slow))
            .route("/caches/:cache_name", delete(slow)),
    )
    .await
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Polls until `key` is no longer cached, or gives up after `within`.
pub async fn wait_for_eviction(state: &AppState, key: &str, within: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if state.cache.get(PRODUCTS_CACHE, key).await.unwrap().is_none() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
