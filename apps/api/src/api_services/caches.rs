use std::sync::Arc;

use openbook_application::SnapshotCache;
use openbook_core::{AppError, AppResult};
use openbook_infrastructure::{InMemorySnapshotCache, RedisSnapshotCache};

use crate::api_config::ApiConfig;

pub(super) fn build_snapshot_cache(config: &ApiConfig) -> AppResult<Option<Arc<dyn SnapshotCache>>> {
    if config.snapshot_cache_ttl_seconds == 0 {
        return Ok(None);
    }

    let Some(redis_url) = config.redis_url.as_deref() else {
        return Ok(Some(Arc::new(InMemorySnapshotCache::new())));
    };

    let redis_client = redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
    Ok(Some(Arc::new(RedisSnapshotCache::new(
        redis_client,
        config.snapshot_cache_key_prefix.as_str(),
    ))))
}
