//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod grant;
mod module;
mod permission;
mod snapshot;

pub use grant::{
    AccessGrants, GrantOrigin, GrantSource, ModuleAccessGrant, PermissionGrant, PoolMembership,
};
pub use module::{Module, ModuleAction, ModuleCode};
pub use permission::{PermissionCode, PermissionScope, ScopeLevel};
pub use snapshot::{
    ResolvedModuleAccess, ResolvedPermission, SessionPermissionSnapshot, SnapshotBuilder,
};
