//! Product Service
//!
//! Read-through caching over the repository, and evict-then-broadcast on
//! every write.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::CacheManager;
use crate::error::{CacheError, Result};
use crate::models::ProductRequest;
use crate::products::{Product, ProductRepository};
use crate::sync::{InvalidationDispatcher, InvalidationRequest};

/// Cache holding products by id.
pub const PRODUCTS_CACHE: &str = "products";

pub struct ProductService {
    repository: ProductRepository,
    cache: Arc<CacheManager<Product>>,
    dispatcher: Arc<InvalidationDispatcher>,
}

impl ProductService {
    pub fn new(
        repository: ProductRepository,
        cache: Arc<CacheManager<Product>>,
        dispatcher: Arc<InvalidationDispatcher>,
    ) -> Self {
        Self {
            repository,
            cache,
            dispatcher,
        }
    }

    // == Get ==
    /// Serves from the cache, falling back to the repository on a miss and
    /// caching what it found.
    pub async fn get(&self, id: u64) -> Result<Product> {
        let key = id.to_string();
        if let Some(product) = self.cache.get(PRODUCTS_CACHE, &key).await? {
            return Ok(product);
        }

        info!("Fetching product from repository (cache miss): {}", id);
        let product = self
            .repository
            .find(id)
            .await
            .ok_or(CacheError::ProductNotFound(id))?;
        self.cache_if_current(&product).await?;
        Ok(product)
    }

    /// Caches `product`, then drops it again if a write replaced or removed
    /// it since it was loaded.
    ///
    /// A write that lands after the recheck still evicts on its own, so a
    /// value older than the repository never stays cached.
    async fn cache_if_current(&self, product: &Product) -> Result<bool> {
        let key = product.id.to_string();
        self.cache.put(PRODUCTS_CACHE, key.as_str(), product.clone()).await?;

        if self.repository.find(product.id).await.as_ref() == Some(product) {
            return Ok(true);
        }
        debug!("Product {} changed while loading, not caching it", product.id);
        self.cache.evict(PRODUCTS_CACHE, &key).await?;
        Ok(false)
    }

    pub async fn list(&self) -> Vec<Product> {
        self.repository.find_all().await
    }

    pub async fn create(&self, request: ProductRequest) -> Product {
        let product = self.repository.insert(request).await;
        info!("Created product {} ({})", product.id, product.name);
        product
    }

    // == Update ==
    pub async fn update(&self, id: u64, request: ProductRequest) -> Result<Product> {
        let product = self
            .repository
            .replace(id, request)
            .await
            .ok_or(CacheError::ProductNotFound(id))?;
        info!("Updated product {}", id);

        self.invalidate(id).await?;
        Ok(product)
    }

    // == Delete ==
    /// Removes the product. Deleting an unknown id still invalidates.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let existed = self.repository.remove(id).await;
        info!("Deleted product {} (existed={})", id, existed);

        self.invalidate(id).await?;
        Ok(())
    }

    // == Invalidate ==
    /// Evicts the local entry, then fires the peer broadcast without waiting.
    async fn invalidate(&self, id: u64) -> Result<()> {
        let key = id.to_string();
        self.cache.evict(PRODUCTS_CACHE, &key).await?;
        // Detached: the write response never waits on peers
        let _ = self
            .dispatcher
            .spawn_broadcast(InvalidationRequest::entry(PRODUCTS_CACHE, key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheSettings;
    use crate::discovery::StaticPeerDirectory;
    use crate::sync::DEFAULT_PEER_TIMEOUT;

    async fn service() -> (ProductService, Arc<CacheManager<Product>>) {
        let cache = CacheManager::shared([PRODUCTS_CACHE], CacheSettings::default());
        let dispatcher = InvalidationDispatcher::new(
            Arc::new(StaticPeerDirectory::new()),
            "cache-sync",
            DEFAULT_PEER_TIMEOUT,
        )
        .unwrap();
        let service = ProductService::new(
            ProductRepository::seeded().await,
            cache.clone(),
            Arc::new(dispatcher),
        );
        (service, cache)
    }

    fn request(name: &str, price: f64) -> ProductRequest {
        ProductRequest {
            name: name.to_string(),
            price,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_get_reads_through() {
        let (service, cache) = service().await;

        assert!(cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
        let product = service.get(1).await.unwrap();

        assert_eq!(product.name, "Laptop");
        assert_eq!(cache.get(PRODUCTS_CACHE, "1").await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn test_value_replaced_while_loading_is_not_cached() {
        let (service, cache) = service().await;
        let loaded = service.repository.find(1).await.unwrap();
        service
            .repository
            .replace(1, request("UpdatedName", 150.0))
            .await
            .unwrap();

        assert!(!service.cache_if_current(&loaded).await.unwrap());
        assert!(cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
        assert_eq!(service.get(1).await.unwrap().name, "UpdatedName");
    }

    #[tokio::test]
    async fn test_value_removed_while_loading_is_not_cached() {
        let (service, cache) = service().await;
        let loaded = service.repository.find(2).await.unwrap();
        service.repository.remove(2).await;

        assert!(!service.cache_if_current(&loaded).await.unwrap());
        assert!(cache.get(PRODUCTS_CACHE, "2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let (service, _) = service().await;

        assert!(matches!(
            service.get(404).await,
            Err(CacheError::ProductNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_update_evicts_local_entry_immediately() {
        let (service, cache) = service().await;
        service.get(1).await.unwrap();

        let updated = service.update(1, request("UpdatedName", 150.0)).await.unwrap();

        assert_eq!(updated.name, "UpdatedName");
        assert!(cache.get(PRODUCTS_CACHE, "1").await.unwrap().is_none());
        assert_eq!(service.get(1).await.unwrap().price, 150.0);
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let (service, _) = service().await;

        assert!(matches!(
            service.update(77, request("x", 1.0)).await,
            Err(CacheError::ProductNotFound(77))
        ));
    }

    #[tokio::test]
    async fn test_delete_evicts_and_removes() {
        let (service, cache) = service().await;
        service.get(2).await.unwrap();

        service.delete(2).await.unwrap();

        assert!(cache.get(PRODUCTS_CACHE, "2").await.unwrap().is_none());
        assert!(matches!(
            service.get(2).await,
            Err(CacheError::ProductNotFound(2))
        ));
    }
}
