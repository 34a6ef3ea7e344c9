//! Product Repository
//!
//! In-memory backing store for products. Each replica holds its own copy;
//! persistence is out of scope.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::models::ProductRequest;
use crate::products::Product;

#[derive(Debug)]
pub struct ProductRepository {
    products: RwLock<BTreeMap<u64, Product>>,
    next_id: AtomicU64,
}

impl Default for ProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            products: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a repository holding the demo catalogue.
    pub async fn seeded() -> Self {
        let repository = Self::new();
        for (name, price, description) in [
            ("Laptop", 999.99, "High-performance laptop"),
            ("Mouse", 29.99, "Wireless mouse"),
            ("Keyboard", 79.99, "Mechanical keyboard"),
        ] {
            repository
                .insert(ProductRequest {
                    name: name.to_string(),
                    price,
                    description: description.to_string(),
                })
                .await;
        }
        repository
    }

    // == Insert ==
    /// Stores a new product under a fresh id.
    pub async fn insert(&self, request: ProductRequest) -> Product {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let product = request.into_product(id);
        self.products.write().await.insert(id, product.clone());
        product
    }

    // == Replace ==
    /// Replaces an existing product. Returns `None` if `id` is unknown.
    pub async fn replace(&self, id: u64, request: ProductRequest) -> Option<Product> {
        let mut products = self.products.write().await;
        let slot = products.get_mut(&id)?;
        *slot = request.into_product(id);
        Some(slot.clone())
    }

    pub async fn find(&self, id: u64) -> Option<Product> {
        self.products.read().await.get(&id).cloned()
    }

    pub async fn find_all(&self) -> Vec<Product> {
        self.products.read().await.values().cloned().collect()
    }

    /// Removes a product. Returns whether it existed.
    pub async fn remove(&self, id: u64) -> bool {
        self.products.write().await.remove(&id).is_some()
    }
}
