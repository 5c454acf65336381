//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod access_payload;
mod built_in_module_catalog;
mod http_access_directory;
mod in_memory_snapshot_cache;
mod json_file_module_catalog;
mod redis_snapshot_cache;
mod static_access_directory;

pub use built_in_module_catalog::BuiltInModuleCatalog;
pub use http_access_directory::HttpAccessDirectory;
pub use in_memory_snapshot_cache::InMemorySnapshotCache;
pub use json_file_module_catalog::JsonFileModuleCatalog;
pub use redis_snapshot_cache::RedisSnapshotCache;
pub use static_access_directory::StaticAccessDirectory;
