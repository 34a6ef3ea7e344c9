//! Request DTOs for the cache sync API
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;

use crate::products::Product;

/// Request body for creating or replacing a product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
}

impl ProductRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Product name cannot be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Some("Product price must be a non-negative number".to_string());
        }
        None
    }

    pub fn into_product(self, id: u64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            description: self.description,
        }
    }
}

/// Query string of `DELETE /caches/{cache_name}`
///
/// Without a key the whole cache is cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvictQuery {
    #[serde(default)]
    pub key: Option<String>,
}
