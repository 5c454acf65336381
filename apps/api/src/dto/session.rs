use chrono::{DateTime, SecondsFormat, Utc};
use openbook_core::Identity;
use openbook_domain::{GrantOrigin, ResolvedModuleAccess, ResolvedPermission, SessionPermissionSnapshot};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the authenticated identity.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/identity-response.ts"
)]
pub struct IdentityResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub is_super_admin: bool,
}

/// Where a resolved grant came from.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/grant-origin-response.ts"
)]
pub struct GrantOriginResponse {
    pub source: String,
    pub pool_name: Option<String>,
}

/// Resolved module access.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/module-access-response.ts"
)]
pub struct ModuleAccessResponse {
    pub module: String,
    pub sources: Vec<GrantOriginResponse>,
}

/// Resolved permission with its widest scope.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/resolved-permission-response.ts"
)]
pub struct ResolvedPermissionResponse {
    pub code: String,
    pub scope: String,
    pub copropiedad_ids: Vec<String>,
    pub sources: Vec<GrantOriginResponse>,
}

/// Identity plus the permission snapshot resolved for this request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub identity: IdentityResponse,
    pub is_super_admin: bool,
    pub modules: Vec<ModuleAccessResponse>,
    pub permissions: Vec<ResolvedPermissionResponse>,
    pub resolved_at: String,
    pub valid_until: Option<String>,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id().to_owned(),
            email: identity.email().to_owned(),
            first_name: identity.first_name().to_owned(),
            last_name: identity.last_name().to_owned(),
            display_name: identity.display_name(),
            is_super_admin: identity.is_super_admin(),
        }
    }
}

impl From<&GrantOrigin> for GrantOriginResponse {
    fn from(origin: &GrantOrigin) -> Self {
        Self {
            source: origin.source().as_str().to_owned(),
            pool_name: origin.pool_name().map(ToOwned::to_owned),
        }
    }
}

impl From<&ResolvedModuleAccess> for ModuleAccessResponse {
    fn from(access: &ResolvedModuleAccess) -> Self {
        Self {
            module: access.module_code().as_str().to_owned(),
            sources: access.sources().map(GrantOriginResponse::from).collect(),
        }
    }
}

impl From<&ResolvedPermission> for ResolvedPermissionResponse {
    fn from(permission: &ResolvedPermission) -> Self {
        Self {
            code: permission.code().to_string(),
            scope: permission.scope().as_str().to_owned(),
            copropiedad_ids: permission
                .copropiedad_ids()
                .map(ToString::to_string)
                .collect(),
            sources: permission.sources().map(GrantOriginResponse::from).collect(),
        }
    }
}

impl SessionResponse {
    /// Builds the response for an authenticated snapshot; `None` when anonymous.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionPermissionSnapshot) -> Option<Self> {
        let identity = snapshot.identity()?;

        Some(Self {
            identity: IdentityResponse::from(identity),
            is_super_admin: snapshot.is_super_admin(),
            modules: snapshot.modules().map(ModuleAccessResponse::from).collect(),
            permissions: snapshot
                .permissions()
                .map(ResolvedPermissionResponse::from)
                .collect(),
            resolved_at: timestamp(snapshot.resolved_at()),
            valid_until: snapshot.valid_until().map(timestamp),
        })
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
