use async_trait::async_trait;
use openbook_core::{AppResult, Identity, SessionToken};
use openbook_domain::{AccessGrants, Module, SessionPermissionSnapshot};

/// Port to the upstream identity/authorization service.
///
/// Implementations report an invalid or expired session as
/// `AppError::Unauthorized` and every transport or upstream failure as
/// `AppError::UpstreamUnavailable`, so callers can tell the two apart.
#[async_trait]
pub trait AccessDirectory: Send + Sync {
    /// Returns the identity behind the session token.
    async fn fetch_identity(&self, token: &SessionToken) -> AppResult<Identity>;

    /// Returns direct grants and pool memberships for the identity.
    async fn fetch_access_grants(
        &self,
        token: &SessionToken,
        identity: &Identity,
    ) -> AppResult<AccessGrants>;
}

/// Port to the module configuration store.
#[async_trait]
pub trait ModuleCatalog: Send + Sync {
    /// Loads every configured module.
    async fn load_modules(&self) -> AppResult<Vec<Module>>;
}

/// Cache key for resolved snapshots: identity plus session version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotCacheKey {
    /// Identity id the snapshot was resolved for.
    pub identity_id: String,
    /// Fingerprint of the session token.
    pub session_version: String,
}

impl SnapshotCacheKey {
    /// Builds a key for an identity resolved from the given token.
    #[must_use]
    pub fn new(identity: &Identity, token: &SessionToken) -> Self {
        Self {
            identity_id: identity.id().to_owned(),
            session_version: token.fingerprint(),
        }
    }
}

/// Port for optional snapshot caching.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Returns a cached snapshot, if present and not expired.
    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<SessionPermissionSnapshot>>;

    /// Stores a snapshot for `ttl_seconds`; zero disables the write.
    async fn set_snapshot(
        &self,
        key: &SnapshotCacheKey,
        snapshot: &SessionPermissionSnapshot,
        ttl_seconds: u32,
    ) -> AppResult<()>;
}
