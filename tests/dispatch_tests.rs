//! Integration Tests for the Invalidation Dispatcher
//!
//! Real replicas on ephemeral ports; the dispatcher talks to them over HTTP.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use cache_sync::{
    discovery::{PeerInstance, StaticPeerDirectory},
    products::PRODUCTS_CACHE,
    CacheError, DispatchOutcome,
};

use common::{
    closed_addr, dispatcher, spawn_replica, spawn_slow_peer, SharedDirectory,
    UnavailableDirectory, SERVICE,
};

const TIMEOUT: Duration = Duration::from_secs(5);

// == Healthy Fleet ==

#[tokio::test]
async fn test_three_healthy_peers_all_evicted() {
    let directory = SharedDirectory::default();
    let mut replicas = Vec::new();
    for id in ["a", "b", "c"] {
        let (addr, state) = spawn_replica(Arc::new(directory.clone())).await;
        directory.add(id, addr);
        state.products.get(1).await.unwrap();
        replicas.push(state);
    }

    // Write on A: local eviction first, then the broadcast
    replicas[0].cache.evict(PRODUCTS_CACHE, "1").await.unwrap();
    assert!(replicas[0].cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, "1")
        .await
        .unwrap();

    assert_eq!(summary.len(), 3);
    assert_eq!(summary.evicted(), 3);
    for id in ["a", "b", "c"] {
        assert_eq!(summary.get(id), Some(&DispatchOutcome::Evicted));
    }
    for state in &replicas {
        assert!(state.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_broadcast_evict_all_clears_peer_cache() {
    let directory = SharedDirectory::default();
    let (addr, state) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("a", addr);
    state.products.get(1).await.unwrap();
    state.products.get(2).await.unwrap();

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict_all(PRODUCTS_CACHE)
        .await
        .unwrap();

    assert_eq!(summary.get("a"), Some(&DispatchOutcome::Evicted));
    assert_eq!(state.cache.stats().await[PRODUCTS_CACHE].total_entries, 0);
}

#[tokio::test]
async fn test_broadcast_every_cache() {
    let directory = SharedDirectory::default();
    let (addr, state) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("a", addr);
    state.products.get(3).await.unwrap();

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict_every_cache()
        .await
        .unwrap();

    assert_eq!(summary.evicted(), 1);
    assert!(state.cache.get(PRODUCTS_CACHE, "3").await.unwrap().is_none());
}

// == Empty and Unavailable Directory ==

#[tokio::test]
async fn test_empty_directory_is_empty_summary() {
    let directory = Arc::new(StaticPeerDirectory::new().with_service(SERVICE, vec![]));

    let summary = dispatcher(directory, TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, "K42")
        .await
        .unwrap();

    assert!(summary.is_empty());
}

#[tokio::test]
async fn test_unavailable_directory_is_distinct_error() {
    let result = dispatcher(Arc::new(UnavailableDirectory), TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, "K42")
        .await;

    assert!(matches!(result, Err(CacheError::DirectoryUnavailable(_))));
}

// == Failure Isolation ==

#[tokio::test]
async fn test_unknown_cache_on_peer_is_rejected() {
    let directory = SharedDirectory::default();
    let (addr_a, _) = spawn_replica(Arc::new(directory.clone())).await;
    let (addr_b, _) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("a", addr_a);
    directory.add("b", addr_b);

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict("orders", "1")
        .await
        .unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary.get("a"), Some(&DispatchOutcome::Rejected { status: 404 }));
    assert_eq!(summary.get("b"), Some(&DispatchOutcome::Rejected { status: 404 }));
}

#[tokio::test]
async fn test_unreachable_peer_does_not_affect_others() {
    let directory = SharedDirectory::default();
    let (addr_a, state_a) = spawn_replica(Arc::new(directory.clone())).await;
    let (addr_b, state_b) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("a", addr_a);
    directory.add("down", closed_addr().await);
    directory.add("b", addr_b);
    state_a.products.get(1).await.unwrap();
    state_b.products.get(1).await.unwrap();

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, "1")
        .await
        .unwrap();

    assert_eq!(summary.len(), 3);
    assert_eq!(summary.get("a"), Some(&DispatchOutcome::Evicted));
    assert_eq!(summary.get("b"), Some(&DispatchOutcome::Evicted));
    assert!(matches!(
        summary.get("down"),
        Some(DispatchOutcome::Unreachable { .. })
    ));
    assert!(state_a.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
    assert!(state_b.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_slow_peer_times_out_without_delaying_others() {
    let directory = SharedDirectory::default();
    let (addr_a, state_a) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("a", addr_a);
    directory.add("slow-1", spawn_slow_peer(Duration::from_secs(30)).await);
    directory.add("slow-2", spawn_slow_peer(Duration::from_secs(30)).await);
    state_a.products.get(1).await.unwrap();

    let timeout = Duration::from_millis(300);
    let started = Instant::now();
    let summary = dispatcher(Arc::new(directory), timeout)
        .broadcast_evict(PRODUCTS_CACHE, "1")
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.len(), 3);
    assert_eq!(summary.get("a"), Some(&DispatchOutcome::Evicted));
    assert_eq!(summary.get("slow-1"), Some(&DispatchOutcome::TimedOut));
    assert_eq!(summary.get("slow-2"), Some(&DispatchOutcome::TimedOut));
    // Calls run in parallel: total time is one timeout, not the sum
    assert!(elapsed < Duration::from_secs(2), "broadcast took {:?}", elapsed);
}

#[tokio::test]
async fn test_shared_peer_id_keeps_one_outcome_per_peer() {
    let directory = SharedDirectory::default();
    let (addr_a, state_a) = spawn_replica(Arc::new(directory.clone())).await;
    let (addr_b, state_b) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("pod", addr_a);
    directory.add("pod", addr_b);
    state_a.products.get(1).await.unwrap();
    state_b.products.get(1).await.unwrap();

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, "1")
        .await
        .unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary.evicted(), 2);
    for addr in [addr_a, addr_b] {
        let key = format!("pod@{}:{}", addr.ip(), addr.port());
        assert_eq!(summary.get(&key), Some(&DispatchOutcome::Evicted));
    }
    assert!(state_a.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
    assert!(state_b.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
}

// == Self Addressing ==

#[tokio::test]
async fn test_self_addressed_call_behaves_like_remote() {
    let directory = SharedDirectory::default();
    let (addr, state) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("self", addr);
    state.products.get(1).await.unwrap();

    // The replica's own dispatcher targets itself
    let summary = state
        .dispatcher
        .broadcast_evict(PRODUCTS_CACHE, "1")
        .await
        .unwrap();

    assert_eq!(summary.get("self"), Some(&DispatchOutcome::Evicted));
    assert!(state.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_keys_are_percent_encoded_on_the_wire() {
    let directory = SharedDirectory::default();
    let (addr, state) = spawn_replica(Arc::new(directory.clone())).await;
    directory.add("a", addr);
    let key = "sku 7&size=L";
    state
        .cache
        .put(PRODUCTS_CACHE, key, state.products.get(1).await.unwrap())
        .await
        .unwrap();

    let summary = dispatcher(Arc::new(directory), TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, key)
        .await
        .unwrap();

    assert_eq!(summary.get("a"), Some(&DispatchOutcome::Evicted));
    assert!(state.cache.get(PRODUCTS_CACHE, key).await.unwrap().is_none());
    // The unrelated entry survives
    assert!(state.cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_static_directory_drives_dispatch() {
    let (addr, state) = spawn_replica(Arc::new(StaticPeerDirectory::new())).await;
    state.products.get(2).await.unwrap();
    let peer = PeerInstance::new("pod-a", addr.ip().to_string(), addr.port());
    let directory = Arc::new(StaticPeerDirectory::new().with_service(SERVICE, vec![peer]));

    let summary = dispatcher(directory, TIMEOUT)
        .broadcast_evict(PRODUCTS_CACHE, "2")
        .await
        .unwrap();

    assert_eq!(summary.get("pod-a"), Some(&DispatchOutcome::Evicted));
}
