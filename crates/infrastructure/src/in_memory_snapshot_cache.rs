use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use openbook_application::{SnapshotCache, SnapshotCacheKey};
use openbook_core::AppResult;
use openbook_domain::SessionPermissionSnapshot;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct SnapshotCacheEntry {
    snapshot: SessionPermissionSnapshot,
    expires_at: Instant,
}

/// In-process snapshot cache for single-instance deployments.
#[derive(Default)]
pub struct InMemorySnapshotCache {
    entries: RwLock<HashMap<SnapshotCacheKey, SnapshotCacheEntry>>,
}

impl InMemorySnapshotCache {
    /// Creates an empty in-memory snapshot cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotCache for InMemorySnapshotCache {
    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<SessionPermissionSnapshot>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.snapshot.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
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

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.clone(),
            SnapshotCacheEntry {
                snapshot: snapshot.clone(),
                expires_at,
            },
        );

        Ok(())
    }
}
