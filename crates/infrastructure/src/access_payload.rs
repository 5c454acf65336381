//! Wire format shared by the upstream access directories.

use chrono::{DateTime, Utc};
use openbook_core::Identity;
use openbook_domain::{
    AccessGrants, GrantOrigin, ModuleAccessGrant, ModuleCode, PermissionCode, PermissionGrant,
    PermissionScope, PoolMembership,
};
use serde::Deserialize;
use tracing::warn;

/// `GET /auth/me` body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdentityPayload {
    id: String,
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    is_super_admin: bool,
    #[serde(default = "default_is_active")]
    is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl IdentityPayload {
    pub(crate) fn into_identity(self) -> Identity {
        Identity::new(
            self.id,
            self.email,
            self.first_name,
            self.last_name,
            self.is_super_admin,
            self.is_active,
        )
    }
}

/// `GET /auth/me/access` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AccessPayload {
    #[serde(default)]
    modules: Vec<ModuleGrantPayload>,
    #[serde(default)]
    permissions: Vec<PermissionGrantPayload>,
    #[serde(default)]
    pools: Vec<PoolPayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModuleGrantPayload {
    module: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
struct PermissionGrantPayload {
    code: String,
    scope: String,
    #[serde(default)]
    scope_id: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
struct PoolPayload {
    name: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    modules: Vec<ModuleGrantPayload>,
    #[serde(default)]
    permissions: Vec<PermissionGrantPayload>,
}

impl ModuleGrantPayload {
    fn decode(&self) -> Option<(ModuleCode, Option<DateTime<Utc>>)> {
        match ModuleCode::new(self.module.as_str()) {
            Ok(code) => Some((code, self.expires_at)),
            Err(error) => {
                warn!(%error, module = self.module.as_str(), "ignoring malformed module grant");
                None
            }
        }
    }
}

impl PermissionGrantPayload {
    fn decode(&self) -> Option<(PermissionCode, PermissionScope, Option<DateTime<Utc>>)> {
        let code = match self.code.parse::<PermissionCode>() {
            Ok(code) => code,
            Err(error) => {
                warn!(%error, code = self.code.as_str(), "ignoring malformed permission grant");
                return None;
            }
        };

        match PermissionScope::from_parts(self.scope.as_str(), self.scope_id.as_deref()) {
            Ok(scope) => Some((code, scope, self.expires_at)),
            Err(error) => {
                warn!(
                    %error,
                    code = self.code.as_str(),
                    scope = self.scope.as_str(),
                    "ignoring permission grant with invalid scope"
                );
                None
            }
        }
    }
}

impl AccessPayload {
    /// Converts the payload into domain grants.
    ///
    /// Entries that fail validation contribute nothing; in particular a
    /// `copropiedad` grant without a scope id is dropped, never widened.
    pub(crate) fn into_grants(self) -> AccessGrants {
        let modules = self
            .modules
            .iter()
            .filter_map(ModuleGrantPayload::decode)
            .map(|(code, expires_at)| ModuleAccessGrant::new(code, GrantOrigin::direct(), expires_at))
            .collect();

        let permissions = self
            .permissions
            .iter()
            .filter_map(PermissionGrantPayload::decode)
            .map(|(code, scope, expires_at)| {
                PermissionGrant::new(code, scope, GrantOrigin::direct(), expires_at)
            })
            .collect();

        let pools = self
            .pools
            .into_iter()
            .filter_map(|pool| {
                let modules = pool
                    .modules
                    .iter()
                    .filter_map(ModuleGrantPayload::decode)
                    .collect();
                let permissions = pool
                    .permissions
                    .iter()
                    .filter_map(PermissionGrantPayload::decode)
                    .collect();

                PoolMembership::new(pool.name.as_str(), pool.expires_at, modules, permissions)
                    .map_err(|error| warn!(%error, "ignoring pool membership without a name"))
                    .ok()
            })
            .collect();

        AccessGrants {
            modules,
            permissions,
            pools,
        }
    }
}
