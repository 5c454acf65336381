use std::sync::Arc;

use chrono::{DateTime, Utc};
use openbook_core::{AppError, AppResult, Identity, SessionToken};
use openbook_domain::{AccessGrants, SessionPermissionSnapshot};
use tracing::{debug, warn};

use crate::{AccessDirectory, ModuleRegistry, PermissionFacade, SnapshotCache, SnapshotCacheKey};

mod cache;

/// Turns an authenticated session into a [`SessionPermissionSnapshot`].
#[derive(Clone)]
pub struct AccessResolver {
    directory: Arc<dyn AccessDirectory>,
    registry: Arc<ModuleRegistry>,
    cache: Option<SnapshotCachePolicy>,
}

#[derive(Clone)]
struct SnapshotCachePolicy {
    cache: Arc<dyn SnapshotCache>,
    ttl_seconds: u32,
}

impl AccessResolver {
    /// Creates a resolver without snapshot caching.
    #[must_use]
    pub fn new(directory: Arc<dyn AccessDirectory>, registry: Arc<ModuleRegistry>) -> Self {
        Self {
            directory,
            registry,
            cache: None,
        }
    }

    /// Enables snapshot caching; a zero TTL keeps caching disabled.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn SnapshotCache>, ttl_seconds: u32) -> Self {
        self.cache = (ttl_seconds > 0).then_some(SnapshotCachePolicy { cache, ttl_seconds });
        self
    }

    /// Resolves the snapshot for the session at the current instant.
    pub async fn resolve(&self, token: &SessionToken) -> AppResult<SessionPermissionSnapshot> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolves the snapshot for the session, evaluating expiry at `now`.
    pub async fn resolve_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> AppResult<SessionPermissionSnapshot> {
        let identity = self.directory.fetch_identity(token).await?;
        if !identity.is_active() {
            return Err(AppError::Unauthorized(format!(
                "identity '{}' is not active",
                identity.id()
            )));
        }

        if identity.is_super_admin() {
            debug!(identity_id = identity.id(), "resolved super-admin snapshot");
            return Ok(SessionPermissionSnapshot::super_admin(
                identity,
                self.registry.list_modules(),
                now,
            ));
        }

        let key = SnapshotCacheKey::new(&identity, token);
        if let Some(snapshot) = self.cached_snapshot(&key, &identity, now).await {
            debug!(identity_id = identity.id(), "reused cached snapshot");
            return Ok(snapshot);
        }

        let grants = self
            .directory
            .fetch_access_grants(token, &identity)
            .await?;
        let snapshot = Self::resolve_grants(identity, &grants, now);
        debug!(
            identity_id = snapshot.identity().map(Identity::id),
            modules = snapshot.modules().count(),
            permissions = snapshot.permissions().count(),
            "resolved session permissions"
        );

        self.store_snapshot(&key, &snapshot, now).await;
        Ok(snapshot)
    }

    /// Unions active direct and pool grants into a snapshot.
    ///
    /// Expired grants and expired pool memberships are dropped before the
    /// union; the caller is responsible for the super-admin bypass.
    #[must_use]
    pub fn resolve_grants(
        identity: Identity,
        grants: &AccessGrants,
        now: DateTime<Utc>,
    ) -> SessionPermissionSnapshot {
        let mut builder = SessionPermissionSnapshot::builder(identity, now);

        for grant in grants.modules.iter().filter(|grant| grant.is_active_at(now)) {
            builder.grant_module(grant);
        }
        for grant in grants
            .permissions
            .iter()
            .filter(|grant| grant.is_active_at(now))
        {
            builder.grant_permission(grant);
        }

        for pool in &grants.pools {
            if !pool.is_active_at(now) {
                debug!(pool = pool.name(), "skipping expired pool membership");
                continue;
            }

            builder.track_expiry(pool.expires_at());
            for grant in pool
                .module_grants()
                .iter()
                .filter(|grant| grant.is_active_at(now))
            {
                builder.grant_module(grant);
            }
            for grant in pool
                .permission_grants()
                .iter()
                .filter(|grant| grant.is_active_at(now))
            {
                builder.grant_permission(grant);
            }
        }

        builder.build()
    }

    /// Builds the facade for an optional session token.
    ///
    /// A missing token or a session the upstream rejects yields an anonymous
    /// facade; upstream failures propagate so the caller can fail closed.
    pub async fn facade_for(&self, token: Option<&SessionToken>) -> AppResult<PermissionFacade> {
        let Some(token) = token else {
            return Ok(PermissionFacade::anonymous(self.registry.clone()));
        };

        match self.resolve(token).await {
            Ok(snapshot) => Ok(PermissionFacade::new(snapshot, self.registry.clone())),
            Err(AppError::Unauthorized(reason)) => {
                debug!(%reason, "session rejected, continuing anonymously");
                Ok(PermissionFacade::anonymous(self.registry.clone()))
            }
            Err(error) => {
                warn!(%error, "failed to resolve session permissions");
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests;
