use super::*;

impl AccessResolver {
    pub(super) async fn cached_snapshot(
        &self,
        key: &SnapshotCacheKey,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Option<SessionPermissionSnapshot> {
        let policy = self.cache.as_ref()?;

        let snapshot = match policy.cache.get_snapshot(key).await {
            Ok(snapshot) => snapshot?,
            Err(error) => {
                warn!(%error, identity_id = key.identity_id.as_str(), "snapshot cache read failed");
                return None;
            }
        };

        // Identity attributes may change between logins sharing a token.
        if snapshot.identity() != Some(identity) {
            return None;
        }
        if snapshot
            .valid_until()
            .is_some_and(|valid_until| valid_until <= now)
        {
            return None;
        }

        Some(snapshot)
    }

    pub(super) async fn store_snapshot(
        &self,
        key: &SnapshotCacheKey,
        snapshot: &SessionPermissionSnapshot,
        now: DateTime<Utc>,
    ) {
        let Some(policy) = self.cache.as_ref() else {
            return;
        };

        let ttl_seconds = cache_ttl_seconds(policy.ttl_seconds, snapshot.valid_until(), now);
        if ttl_seconds == 0 {
            return;
        }

        if let Err(error) = policy
            .cache
            .set_snapshot(key, snapshot, ttl_seconds)
            .await
        {
            warn!(%error, identity_id = key.identity_id.as_str(), "snapshot cache write failed");
        }
    }
}

/// Caps the configured TTL so a cached snapshot never outlives its earliest grant.
pub(super) fn cache_ttl_seconds(
    configured_ttl_seconds: u32,
    valid_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u32 {
    let Some(valid_until) = valid_until else {
        return configured_ttl_seconds;
    };

    let remaining = (valid_until - now).num_seconds();
    if remaining <= 0 {
        return 0;
    }

    u32::try_from(remaining)
        .unwrap_or(u32::MAX)
        .min(configured_ttl_seconds)
}
