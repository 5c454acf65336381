//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_resolver;
mod module_registry;
mod permission_facade;
mod route_guard;

pub use access_ports::{AccessDirectory, ModuleCatalog, SnapshotCache, SnapshotCacheKey};
pub use access_resolver::AccessResolver;
pub use module_registry::ModuleRegistry;
pub use permission_facade::PermissionFacade;
pub use route_guard::{GuardOutcome, GuardRequirement, RouteGuard};
