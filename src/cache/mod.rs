// Cache storage module

pub mod models;
pub mod storage;

pub use models::{CacheEntry, StoredResponse};
pub use storage::CacheStorage;
