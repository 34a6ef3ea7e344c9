//! API Module
//!
//! HTTP handlers and routing. Serves both the peer-facing invalidation
//! endpoint and the administrative/product surface.
//!
//! # Endpoints
//! - `DELETE /caches[/:cache_name][?key=]` - Invalidation endpoint
//! - `/api/cache/*` - Sync triggers, local clear, discovery info, stats
//! - `/api/products[/:id]` - Product CRUD
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod invalidation;
pub mod products;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
