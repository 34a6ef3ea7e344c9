//! Products Module
//!
//! The entity store whose writes trigger invalidations.

mod model;
mod repository;
mod service;

pub use model::Product;
pub use repository::ProductRepository;
pub use service::{ProductService, PRODUCTS_CACHE};
