use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use openbook_core::{AppError, AppResult, Identity, SessionToken};
use openbook_domain::{
    AccessGrants, GrantOrigin, Module, ModuleAccessGrant, ModuleAction, ModuleCode,
    PermissionGrant, PermissionScope, PoolMembership, ScopeLevel, SessionPermissionSnapshot,
};
use tokio::sync::Mutex;

use crate::{AccessDirectory, ModuleRegistry, SnapshotCache, SnapshotCacheKey};

use super::AccessResolver;
use super::cache::cache_ttl_seconds;

enum DirectoryBehavior {
    Sessions(HashMap<String, (Identity, AccessGrants)>),
    Unavailable,
}

struct FakeAccessDirectory {
    behavior: DirectoryBehavior,
    grant_lookups: AtomicUsize,
}

impl FakeAccessDirectory {
    fn with_session(token: &str, identity: Identity, grants: AccessGrants) -> Self {
        Self {
            behavior: DirectoryBehavior::Sessions(HashMap::from([(
                token.to_owned(),
                (identity, grants),
            )])),
            grant_lookups: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            behavior: DirectoryBehavior::Unavailable,
            grant_lookups: AtomicUsize::new(0),
        }
    }

    fn session(&self, token: &SessionToken) -> AppResult<&(Identity, AccessGrants)> {
        match &self.behavior {
            DirectoryBehavior::Sessions(sessions) => sessions
                .get(token.expose())
                .ok_or_else(|| AppError::Unauthorized("unknown session".to_owned())),
            DirectoryBehavior::Unavailable => Err(AppError::UpstreamUnavailable(
                "connection refused".to_owned(),
            )),
        }
    }
}

#[async_trait]
impl AccessDirectory for FakeAccessDirectory {
    async fn fetch_identity(&self, token: &SessionToken) -> AppResult<Identity> {
        self.session(token).map(|(identity, _)| identity.clone())
    }

    async fn fetch_access_grants(
        &self,
        token: &SessionToken,
        _identity: &Identity,
    ) -> AppResult<AccessGrants> {
        self.grant_lookups.fetch_add(1, Ordering::SeqCst);
        self.session(token).map(|(_, grants)| grants.clone())
    }
}

#[derive(Default)]
struct FakeSnapshotCache {
    entries: Mutex<HashMap<SnapshotCacheKey, (SessionPermissionSnapshot, u32)>>,
}

#[async_trait]
impl SnapshotCache for FakeSnapshotCache {
    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<SessionPermissionSnapshot>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .map(|(snapshot, _)| snapshot.clone()))
    }

    async fn set_snapshot(
        &self,
        key: &SnapshotCacheKey,
        snapshot: &SessionPermissionSnapshot,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.clone(), (snapshot.clone(), ttl_seconds));
        Ok(())
    }
}

struct FailingSnapshotCache;

#[async_trait]
impl SnapshotCache for FailingSnapshotCache {
    async fn get_snapshot(
        &self,
        _key: &SnapshotCacheKey,
    ) -> AppResult<Option<SessionPermissionSnapshot>> {
        Err(AppError::Internal("cache offline".to_owned()))
    }

    async fn set_snapshot(
        &self,
        _key: &SnapshotCacheKey,
        _snapshot: &SessionPermissionSnapshot,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        Err(AppError::Internal("cache offline".to_owned()))
    }
}

fn registry() -> Arc<ModuleRegistry> {
    let modules = [("users", 1, "/users"), ("aportes", 2, "/aportes"), ("reportes", 3, "/reportes")]
        .into_iter()
        .filter_map(|(code, order, path)| {
            let actions = ["read", "create"]
                .iter()
                .filter_map(|action| ModuleAction::new(*action, *action).ok())
                .collect();
            Module::new(code, code, path, code, order, actions).ok()
        })
        .collect();

    Arc::new(ModuleRegistry::new(modules).unwrap_or_default())
}

fn resident() -> Identity {
    Identity::new("u-42", "res@openbook.co", "Camila", "Ortiz", false, true)
}

fn token(value: &str) -> SessionToken {
    SessionToken::new(value).unwrap_or_else(|| unreachable!("non-empty token"))
}

fn module_code(value: &str) -> ModuleCode {
    ModuleCode::new(value).unwrap_or_else(|_| unreachable!("valid module code"))
}

fn permission(code: &str, scope: PermissionScope, origin: GrantOrigin) -> PermissionGrant {
    PermissionGrant::new(
        code.parse()
            .unwrap_or_else(|_| unreachable!("valid permission code")),
        scope,
        origin,
        None,
    )
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

#[tokio::test]
async fn super_admin_bypasses_grant_lookup() {
    let admin = Identity::new("root", "root@openbook.co", "Root", "", true, true);
    let directory = Arc::new(FakeAccessDirectory::with_session(
        "admin-token",
        admin,
        AccessGrants::default(),
    ));
    let resolver = AccessResolver::new(directory.clone(), registry());

    let snapshot = resolver.resolve(&token("admin-token")).await;
    let Ok(snapshot) = snapshot else {
        panic!("super admin should resolve");
    };

    assert!(snapshot.is_super_admin());
    assert_eq!(snapshot.modules().count(), 3);
    assert_eq!(
        snapshot.permission("reportes:create").map(|value| value.scope()),
        Some(ScopeLevel::All)
    );
    assert_eq!(directory.grant_lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_session_is_unauthenticated() {
    let resolver = AccessResolver::new(
        Arc::new(FakeAccessDirectory::with_session(
            "known",
            resident(),
            AccessGrants::default(),
        )),
        registry(),
    );

    let result = resolver.resolve(&token("other")).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn inactive_identity_is_unauthenticated() {
    let inactive = Identity::new("u-9", "old@openbook.co", "Old", "User", false, false);
    let resolver = AccessResolver::new(
        Arc::new(FakeAccessDirectory::with_session(
            "t",
            inactive,
            AccessGrants::default(),
        )),
        registry(),
    );

    let result = resolver.resolve(&token("t")).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn upstream_failure_propagates() {
    let resolver = AccessResolver::new(Arc::new(FakeAccessDirectory::unavailable()), registry());

    let result = resolver.resolve(&token("t")).await;
    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));

    let facade = resolver.facade_for(Some(&token("t"))).await;
    assert!(matches!(facade, Err(AppError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn facade_for_degrades_to_anonymous_without_valid_session() {
    let resolver = AccessResolver::new(
        Arc::new(FakeAccessDirectory::with_session(
            "known",
            resident(),
            AccessGrants::default(),
        )),
        registry(),
    );

    let missing = resolver.facade_for(None).await;
    assert!(missing.is_ok_and(|facade| !facade.is_authenticated()));

    let rejected = resolver.facade_for(Some(&token("stale"))).await;
    assert!(rejected.is_ok_and(|facade| !facade.is_authenticated() && !facade.can("users:read")));
}

#[test]
fn expired_grants_contribute_nothing() {
    let now = fixed_now();
    let grants = AccessGrants {
        modules: vec![
            ModuleAccessGrant::new(
                module_code("reportes"),
                GrantOrigin::direct(),
                Some(now - Duration::days(1)),
            ),
            ModuleAccessGrant::new(
                module_code("users"),
                GrantOrigin::direct(),
                Some(now + Duration::days(1)),
            ),
        ],
        permissions: vec![PermissionGrant::new(
            "reportes:read"
                .parse()
                .unwrap_or_else(|_| unreachable!("valid permission code")),
            PermissionScope::All,
            GrantOrigin::direct(),
            Some(now - Duration::seconds(1)),
        )],
        pools: Vec::new(),
    };

    let snapshot = AccessResolver::resolve_grants(resident(), &grants, now);
    assert!(snapshot.module("reportes").is_none());
    assert!(snapshot.permission("reportes:read").is_none());
    assert!(snapshot.module("users").is_some());
    assert_eq!(snapshot.valid_until(), Some(now + Duration::days(1)));
}

#[test]
fn expired_pool_membership_drops_all_pool_grants() {
    let now = fixed_now();
    let pool = PoolMembership::new(
        "finance-team",
        Some(now - Duration::hours(2)),
        vec![(module_code("aportes"), None)],
        Vec::new(),
    )
    .unwrap_or_else(|_| unreachable!("valid pool"));
    let grants = AccessGrants {
        pools: vec![pool],
        ..AccessGrants::default()
    };

    let snapshot = AccessResolver::resolve_grants(resident(), &grants, now);
    assert!(snapshot.module("aportes").is_none());
}

#[test]
fn pool_own_and_direct_all_resolve_to_all_in_any_order() {
    let now = fixed_now();
    let pool_name =
        openbook_core::NonEmptyString::new("board").unwrap_or_else(|_| unreachable!("name"));
    let pool_grant = permission(
        "aportes:update",
        PermissionScope::Own,
        GrantOrigin::pool(&pool_name),
    );
    let direct_grant = permission("aportes:update", PermissionScope::All, GrantOrigin::direct());

    let forward = AccessGrants {
        permissions: vec![pool_grant.clone(), direct_grant.clone()],
        ..AccessGrants::default()
    };
    let reversed = AccessGrants {
        permissions: vec![direct_grant, pool_grant],
        ..AccessGrants::default()
    };

    let first = AccessResolver::resolve_grants(resident(), &forward, now);
    let second = AccessResolver::resolve_grants(resident(), &reversed, now);
    assert_eq!(
        first.permission("aportes:update").map(|value| value.scope()),
        Some(ScopeLevel::All)
    );
    assert_eq!(first, second);
}

#[tokio::test]
async fn resolving_twice_yields_equal_snapshots() {
    let grants = AccessGrants {
        permissions: vec![permission(
            "aportes:read",
            PermissionScope::from_parts("copropiedad", Some("C1"))
                .unwrap_or_else(|_| unreachable!("valid scope")),
            GrantOrigin::direct(),
        )],
        ..AccessGrants::default()
    };
    let resolver = AccessResolver::new(
        Arc::new(FakeAccessDirectory::with_session("t", resident(), grants)),
        registry(),
    );

    let now = fixed_now();
    let first = resolver.resolve_at(&token("t"), now).await;
    let second = resolver.resolve_at(&token("t"), now).await;
    assert!(first.is_ok());
    assert_eq!(first.ok(), second.ok());
}

#[tokio::test]
async fn cached_snapshot_skips_grant_lookup() {
    let directory = Arc::new(FakeAccessDirectory::with_session(
        "t",
        resident(),
        AccessGrants {
            modules: vec![ModuleAccessGrant::new(
                module_code("users"),
                GrantOrigin::direct(),
                None,
            )],
            ..AccessGrants::default()
        },
    ));
    let cache = Arc::new(FakeSnapshotCache::default());
    let resolver = AccessResolver::new(directory.clone(), registry()).with_cache(cache.clone(), 30);

    let now = fixed_now();
    let first = resolver.resolve_at(&token("t"), now).await;
    let second = resolver.resolve_at(&token("t"), now).await;

    assert_eq!(first.ok(), second.ok());
    assert_eq!(directory.grant_lookups.load(Ordering::SeqCst), 1);

    let key = SnapshotCacheKey::new(&resident(), &token("t"));
    let ttl = cache.entries.lock().await.get(&key).map(|(_, ttl)| *ttl);
    assert_eq!(ttl, Some(30));
}

#[tokio::test]
async fn cache_is_keyed_by_session_version() {
    let mut sessions = HashMap::new();
    sessions.insert("t1".to_owned(), (resident(), AccessGrants::default()));
    sessions.insert("t2".to_owned(), (resident(), AccessGrants::default()));
    let directory = Arc::new(FakeAccessDirectory {
        behavior: DirectoryBehavior::Sessions(sessions),
        grant_lookups: AtomicUsize::new(0),
    });
    let resolver = AccessResolver::new(directory.clone(), registry())
        .with_cache(Arc::new(FakeSnapshotCache::default()), 30);

    let now = fixed_now();
    assert!(resolver.resolve_at(&token("t1"), now).await.is_ok());
    assert!(resolver.resolve_at(&token("t2"), now).await.is_ok());
    assert_eq!(directory.grant_lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cache_failures_fall_back_to_upstream() {
    let directory = Arc::new(FakeAccessDirectory::with_session(
        "t",
        resident(),
        AccessGrants::default(),
    ));
    let resolver = AccessResolver::new(directory.clone(), registry())
        .with_cache(Arc::new(FailingSnapshotCache), 30);

    let snapshot = resolver.resolve(&token("t")).await;
    assert!(snapshot.is_ok_and(|snapshot| snapshot.is_authenticated()));
    assert_eq!(directory.grant_lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn cache_ttl_never_outlives_earliest_grant() {
    let now = fixed_now();
    assert_eq!(cache_ttl_seconds(60, None, now), 60);
    assert_eq!(cache_ttl_seconds(60, Some(now + Duration::seconds(10)), now), 10);
    assert_eq!(cache_ttl_seconds(60, Some(now + Duration::hours(1)), now), 60);
    assert_eq!(cache_ttl_seconds(60, Some(now), now), 0);
}
