// Service exports
pub mod cache;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use store::{Store, StoreError};
