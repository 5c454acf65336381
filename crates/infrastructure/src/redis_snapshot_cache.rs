//! Redis-backed session snapshot cache.

use async_trait::async_trait;
use openbook_application::{SnapshotCache, SnapshotCacheKey};
use openbook_core::{AppError, AppResult};
use openbook_domain::SessionPermissionSnapshot;
use redis::AsyncCommands;

/// Redis implementation of the snapshot cache port.
#[derive(Clone)]
pub struct RedisSnapshotCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSnapshotCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &SnapshotCacheKey) -> String {
        format!(
            "{}:identity={}:session={}",
            self.key_prefix, key.identity_id, key.session_version
        )
    }
}

#[async_trait]
impl SnapshotCache for RedisSnapshotCache {
    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<SessionPermissionSnapshot>> {
        let redis_key = self.key_for(key);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let encoded: Option<String> = connection.get(redis_key).await.map_err(|error| {
            AppError::Internal(format!("failed to read snapshot cache entry: {error}"))
        })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str(value).map_err(|error| {
                    AppError::Internal(format!("invalid snapshot cache entry: {error}"))
                })
            })
            .transpose()
    }

    async fn set_snapshot(
        &self,
        key: &SnapshotCacheKey,
        snapshot: &SessionPermissionSnapshot,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let redis_key = self.key_for(key);
        let value = serde_json::to_string(snapshot).map_err(|error| {
            AppError::Internal(format!("failed to encode snapshot cache entry: {error}"))
        })?;
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        connection
            .set_ex(redis_key, value, u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write snapshot cache entry: {error}"))
            })
    }
}
