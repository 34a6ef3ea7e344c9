//! Request and Response models for the cache sync API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{EvictQuery, ProductRequest};
pub use responses::{
    CacheStatsResponse, ErrorResponse, EvictResponse, HealthResponse, InfoResponse, InstanceInfo,
    LocalClearResponse, SyncResponse,
};
