use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use openbook_core::{CopropiedadId, Identity};
use serde::{Deserialize, Serialize};

use crate::{
    GrantOrigin, Module, ModuleAccessGrant, ModuleCode, PermissionCode, PermissionGrant,
    ScopeLevel,
};

/// Resolved access to one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModuleAccess {
    module_code: ModuleCode,
    sources: BTreeSet<GrantOrigin>,
}

impl ResolvedModuleAccess {
    /// Returns the module code.
    #[must_use]
    pub fn module_code(&self) -> &ModuleCode {
        &self.module_code
    }

    /// Returns every origin that contributed access, in a stable order.
    pub fn sources(&self) -> impl Iterator<Item = &GrantOrigin> {
        self.sources.iter()
    }
}

/// Resolved permission with its widest scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPermission {
    code: PermissionCode,
    scope: ScopeLevel,
    copropiedad_ids: BTreeSet<CopropiedadId>,
    sources: BTreeSet<GrantOrigin>,
}

impl ResolvedPermission {
    /// Returns the permission code.
    #[must_use]
    pub fn code(&self) -> &PermissionCode {
        &self.code
    }

    /// Returns the widest scope observed across all sources.
    #[must_use]
    pub fn scope(&self) -> ScopeLevel {
        self.scope
    }

    /// Returns every copropiedad the permission was scoped to.
    pub fn copropiedad_ids(&self) -> impl Iterator<Item = &CopropiedadId> {
        self.copropiedad_ids.iter()
    }

    /// Returns every origin that contributed the permission, in a stable order.
    pub fn sources(&self) -> impl Iterator<Item = &GrantOrigin> {
        self.sources.iter()
    }
}

/// Immutable authorization view of one identity at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPermissionSnapshot {
    identity: Option<Identity>,
    is_super_admin: bool,
    modules: BTreeMap<String, ResolvedModuleAccess>,
    permissions: BTreeMap<String, ResolvedPermission>,
    resolved_at: DateTime<Utc>,
    valid_until: Option<DateTime<Utc>>,
}

impl SessionPermissionSnapshot {
    /// Snapshot for a caller without a valid session.
    #[must_use]
    pub fn anonymous(resolved_at: DateTime<Utc>) -> Self {
        Self {
            identity: None,
            is_super_admin: false,
            modules: BTreeMap::new(),
            permissions: BTreeMap::new(),
            resolved_at,
            valid_until: None,
        }
    }

    /// Snapshot granting every registered module and permission with scope `all`.
    #[must_use]
    pub fn super_admin<'a>(
        identity: Identity,
        modules: impl IntoIterator<Item = &'a Module>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        let mut builder = SnapshotBuilder {
            identity,
            resolved_at,
            modules: BTreeMap::new(),
            permissions: BTreeMap::new(),
            valid_until: None,
        };

        for module in modules {
            builder.insert_module(module.code(), None);
            for action in module.actions() {
                if let Ok(code) = PermissionCode::new(module.code().clone(), action.code()) {
                    builder.insert_permission(&code, ScopeLevel::All, None, None);
                }
            }
        }

        let mut snapshot = builder.build();
        snapshot.is_super_admin = true;
        snapshot
    }

    /// Starts building a snapshot for a non super-admin identity.
    #[must_use]
    pub fn builder(identity: Identity, resolved_at: DateTime<Utc>) -> SnapshotBuilder {
        SnapshotBuilder {
            identity,
            resolved_at,
            modules: BTreeMap::new(),
            permissions: BTreeMap::new(),
            valid_until: None,
        }
    }

    /// Returns the identity, absent for anonymous callers.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns whether the snapshot belongs to an authenticated identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns the super-admin flag.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Returns resolved access for a module code.
    #[must_use]
    pub fn module(&self, module_code: &str) -> Option<&ResolvedModuleAccess> {
        self.modules.get(module_code)
    }

    /// Returns resolved details for a permission code.
    #[must_use]
    pub fn permission(&self, permission_code: &str) -> Option<&ResolvedPermission> {
        self.permissions.get(permission_code)
    }

    /// Returns accessible modules ordered by code.
    pub fn modules(&self) -> impl Iterator<Item = &ResolvedModuleAccess> {
        self.modules.values()
    }

    /// Returns resolved permissions ordered by code.
    pub fn permissions(&self) -> impl Iterator<Item = &ResolvedPermission> {
        self.permissions.values()
    }

    /// Returns the resolution instant.
    #[must_use]
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Returns the earliest expiry among included grants.
    #[must_use]
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }
}

/// Accumulates active grants into a snapshot.
///
/// Union is order independent: per permission code the widest scope wins and
/// origins are kept as a sorted set.
#[derive(Debug)]
pub struct SnapshotBuilder {
    identity: Identity,
    resolved_at: DateTime<Utc>,
    modules: BTreeMap<String, ResolvedModuleAccess>,
    permissions: BTreeMap<String, ResolvedPermission>,
    valid_until: Option<DateTime<Utc>>,
}

impl SnapshotBuilder {
    /// Adds a module grant. Callers filter out expired grants first.
    pub fn grant_module(&mut self, grant: &ModuleAccessGrant) -> &mut Self {
        self.insert_module(grant.module_code(), Some(grant.origin()));
        self.track_expiry(grant.expires_at());
        self
    }

    /// Adds a permission grant and the module access it implies.
    pub fn grant_permission(&mut self, grant: &PermissionGrant) -> &mut Self {
        self.insert_module(grant.code().module(), Some(grant.origin()));
        self.insert_permission(
            grant.code(),
            grant.scope().level(),
            grant.scope().copropiedad_id(),
            Some(grant.origin()),
        );
        self.track_expiry(grant.expires_at());
        self
    }

    /// Lowers `valid_until` to `expires_at` when it is earlier.
    pub fn track_expiry(&mut self, expires_at: Option<DateTime<Utc>>) -> &mut Self {
        if let Some(expires_at) = expires_at {
            self.valid_until = Some(
                self.valid_until
                    .map_or(expires_at, |current| current.min(expires_at)),
            );
        }
        self
    }

    /// Finalizes the immutable snapshot.
    #[must_use]
    pub fn build(self) -> SessionPermissionSnapshot {
        SessionPermissionSnapshot {
            identity: Some(self.identity),
            is_super_admin: false,
            modules: self.modules,
            permissions: self.permissions,
            resolved_at: self.resolved_at,
            valid_until: self.valid_until,
        }
    }

    fn insert_module(&mut self, module_code: &ModuleCode, origin: Option<&GrantOrigin>) {
        let entry = self
            .modules
            .entry(module_code.as_str().to_owned())
            .or_insert_with(|| ResolvedModuleAccess {
                module_code: module_code.clone(),
                sources: BTreeSet::new(),
            });

        if let Some(origin) = origin {
            entry.sources.insert(origin.clone());
        }
    }

    fn insert_permission(
        &mut self,
        code: &PermissionCode,
        scope: ScopeLevel,
        copropiedad_id: Option<&CopropiedadId>,
        origin: Option<&GrantOrigin>,
    ) {
        let entry = self
            .permissions
            .entry(code.to_string())
            .or_insert_with(|| ResolvedPermission {
                code: code.clone(),
                scope,
                copropiedad_ids: BTreeSet::new(),
                sources: BTreeSet::new(),
            });

        entry.scope = entry.scope.max(scope);
        if let Some(copropiedad_id) = copropiedad_id {
            entry.copropiedad_ids.insert(copropiedad_id.clone());
        }
        if let Some(origin) = origin {
            entry.sources.insert(origin.clone());
        }
    }
}
