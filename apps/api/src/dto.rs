mod modules;
mod pages;
mod session;

pub use modules::{ModuleResponse, PermissionCheckResponse};
pub use pages::{PageKind, PageResponse};
pub use session::{HealthResponse, SessionResponse};
