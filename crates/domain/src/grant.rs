use chrono::{DateTime, Utc};
use openbook_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{ModuleCode, PermissionCode, PermissionScope};

/// How a grant reached the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantSource {
    /// Assigned to the identity itself.
    Direct,
    /// Inherited through pool membership.
    Pool,
}

impl GrantSource {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Pool => "pool",
        }
    }
}

/// Traceable origin of a grant: direct, or a named pool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrantOrigin {
    source: GrantSource,
    pool_name: Option<String>,
}

impl GrantOrigin {
    /// Origin of a grant assigned directly to the identity.
    #[must_use]
    pub fn direct() -> Self {
        Self {
            source: GrantSource::Direct,
            pool_name: None,
        }
    }

    /// Origin of a grant inherited from the named pool.
    #[must_use]
    pub fn pool(pool_name: &NonEmptyString) -> Self {
        Self {
            source: GrantSource::Pool,
            pool_name: Some(pool_name.as_str().to_owned()),
        }
    }

    /// Returns the grant source.
    #[must_use]
    pub fn source(&self) -> GrantSource {
        self.source
    }

    /// Returns the pool name for pool-derived grants.
    #[must_use]
    pub fn pool_name(&self) -> Option<&str> {
        self.pool_name.as_deref()
    }
}

fn is_active_at(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_none_or(|expires_at| expires_at > now)
}

/// Module access granted to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccessGrant {
    module_code: ModuleCode,
    origin: GrantOrigin,
    expires_at: Option<DateTime<Utc>>,
}

impl ModuleAccessGrant {
    /// Creates a module access grant.
    #[must_use]
    pub fn new(
        module_code: ModuleCode,
        origin: GrantOrigin,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            module_code,
            origin,
            expires_at,
        }
    }

    /// Returns the granted module code.
    #[must_use]
    pub fn module_code(&self) -> &ModuleCode {
        &self.module_code
    }

    /// Returns the grant origin.
    #[must_use]
    pub fn origin(&self) -> &GrantOrigin {
        &self.origin
    }

    /// Returns the optional expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns whether the grant is still active at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        is_active_at(self.expires_at, now)
    }
}

/// Scoped permission granted to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    code: PermissionCode,
    scope: PermissionScope,
    origin: GrantOrigin,
    expires_at: Option<DateTime<Utc>>,
}

impl PermissionGrant {
    /// Creates a permission grant.
    #[must_use]
    pub fn new(
        code: PermissionCode,
        scope: PermissionScope,
        origin: GrantOrigin,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code,
            scope,
            origin,
            expires_at,
        }
    }

    /// Returns the permission code.
    #[must_use]
    pub fn code(&self) -> &PermissionCode {
        &self.code
    }

    /// Returns the grant scope.
    #[must_use]
    pub fn scope(&self) -> &PermissionScope {
        &self.scope
    }

    /// Returns the grant origin.
    #[must_use]
    pub fn origin(&self) -> &GrantOrigin {
        &self.origin
    }

    /// Returns the optional expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns whether the grant is still active at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        is_active_at(self.expires_at, now)
    }
}

/// Named bundle of grants the identity is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMembership {
    name: NonEmptyString,
    expires_at: Option<DateTime<Utc>>,
    module_grants: Vec<ModuleAccessGrant>,
    permission_grants: Vec<PermissionGrant>,
}

impl PoolMembership {
    /// Creates a pool membership; every grant is stamped with the pool origin.
    pub fn new(
        name: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        modules: Vec<(ModuleCode, Option<DateTime<Utc>>)>,
        permissions: Vec<(PermissionCode, PermissionScope, Option<DateTime<Utc>>)>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        let origin = GrantOrigin::pool(&name);

        let module_grants = modules
            .into_iter()
            .map(|(code, expires_at)| ModuleAccessGrant::new(code, origin.clone(), expires_at))
            .collect();
        let permission_grants = permissions
            .into_iter()
            .map(|(code, scope, expires_at)| {
                PermissionGrant::new(code, scope, origin.clone(), expires_at)
            })
            .collect();

        Ok(Self {
            name,
            expires_at,
            module_grants,
            permission_grants,
        })
    }

    /// Returns the pool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional membership expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns whether the membership is still active at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        is_active_at(self.expires_at, now)
    }

    /// Returns module grants carried by the pool.
    #[must_use]
    pub fn module_grants(&self) -> &[ModuleAccessGrant] {
        &self.module_grants
    }

    /// Returns permission grants carried by the pool.
    #[must_use]
    pub fn permission_grants(&self) -> &[PermissionGrant] {
        &self.permission_grants
    }
}

/// Raw grant set delivered by the authorization service for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrants {
    /// Module grants assigned directly.
    pub modules: Vec<ModuleAccessGrant>,
    /// Permission grants assigned directly.
    pub permissions: Vec<PermissionGrant>,
    /// Pool memberships with their grants.
    pub pools: Vec<PoolMembership>,
}
