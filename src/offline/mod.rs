//! Offline asset cache
//!
//! A worker-style interceptor: at install time it copies a fixed manifest of
//! site assets into a named, versioned cache, then serves every request
//! cache-first with network fallback.
//!
//! Bumping the cache name creates a new cache alongside the old ones. Older
//! caches are never evicted and are still consulted first on lookup.

pub mod controller;
pub mod http;
pub mod manifest;
pub mod network;
pub mod registration;
pub mod storage;

pub use controller::{FetchSource, Fetched, InstallReport, OfflineCacheController, WorkerState};
pub use http::{Request, Response};
pub use manifest::{Manifest, CACHE_NAME};
pub use network::{HttpNetwork, Network};
pub use registration::WorkerRegistration;
pub use storage::{CacheStorage, DiskCacheStorage, MemoryCacheStorage};
