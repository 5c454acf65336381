use std::sync::Arc;

use chrono::Utc;
use openbook_core::{AppError, AppResult, Identity};
use openbook_domain::{Module, ModuleAction, ResolvedPermission, SessionPermissionSnapshot};

use crate::ModuleRegistry;

/// Authorization decisions for one request, backed by an immutable snapshot.
///
/// Boolean queries never fail: unauthenticated callers, missing grants and
/// unknown codes all answer `false`. Only the `require_*` family returns
/// errors, and only `Forbidden` (or `Unauthorized` for
/// [`PermissionFacade::require_authenticated`]).
#[derive(Debug, Clone)]
pub struct PermissionFacade {
    snapshot: SessionPermissionSnapshot,
    registry: Arc<ModuleRegistry>,
}

impl PermissionFacade {
    /// Wraps a resolved snapshot.
    #[must_use]
    pub fn new(snapshot: SessionPermissionSnapshot, registry: Arc<ModuleRegistry>) -> Self {
        Self { snapshot, registry }
    }

    /// Facade for a caller without a valid session.
    #[must_use]
    pub fn anonymous(registry: Arc<ModuleRegistry>) -> Self {
        Self::new(SessionPermissionSnapshot::anonymous(Utc::now()), registry)
    }

    /// Returns the backing snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &SessionPermissionSnapshot {
        &self.snapshot
    }

    /// Returns the authenticated identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.snapshot.identity()
    }

    /// Returns whether a snapshot was resolved for a non-anonymous identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.snapshot.is_authenticated()
    }

    /// Returns whether the identity bypasses grant checks.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.snapshot.is_authenticated() && self.snapshot.is_super_admin()
    }

    /// Returns whether the caller can access the module.
    #[must_use]
    pub fn has_module(&self, code: &str) -> bool {
        self.is_super_admin() || self.snapshot.module(code).is_some()
    }

    /// Returns whether the caller holds the `<module>:<action>` permission.
    ///
    /// Scope ids are not matched against any target resource here.
    #[must_use]
    pub fn can(&self, permission_code: &str) -> bool {
        self.is_super_admin() || self.snapshot.permission(permission_code).is_some()
    }

    /// Returns resolved scope details for a permission the caller holds.
    #[must_use]
    pub fn permission(&self, permission_code: &str) -> Option<&ResolvedPermission> {
        self.snapshot.permission(permission_code)
    }

    /// Returns module metadata, or `None` when unknown or inaccessible.
    #[must_use]
    pub fn get_module(&self, code: &str) -> Option<&Module> {
        if !self.has_module(code) {
            return None;
        }

        self.registry.get_module(code)
    }

    /// Returns registered modules the caller can access, in navigation order.
    #[must_use]
    pub fn accessible_modules(&self) -> Vec<&Module> {
        self.registry
            .list_modules()
            .iter()
            .filter(|module| self.has_module(module.code().as_str()))
            .collect()
    }

    /// Returns the module's declared actions the caller may perform.
    #[must_use]
    pub fn allowed_actions(&self, module_code: &str) -> Vec<&ModuleAction> {
        let Some(module) = self.get_module(module_code) else {
            return Vec::new();
        };

        module
            .actions()
            .iter()
            .filter(|action| self.can(&format!("{module_code}:{}", action.code())))
            .collect()
    }

    /// Fails with `Unauthorized` when there is no authenticated identity.
    pub fn require_authenticated(&self) -> AppResult<()> {
        if self.is_authenticated() {
            return Ok(());
        }

        Err(AppError::Unauthorized("authentication required".to_owned()))
    }

    /// Fails with `Forbidden` when the caller cannot access the module.
    pub fn require_module(&self, code: &str) -> AppResult<()> {
        if self.has_module(code) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "{} is missing access to module '{code}'",
            self.subject_label()
        )))
    }

    /// Fails with `Forbidden` when the caller lacks the permission.
    pub fn require_permission(&self, permission_code: &str) -> AppResult<()> {
        if self.can(permission_code) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "{} is missing permission '{permission_code}'",
            self.subject_label()
        )))
    }

    /// Fails with `Forbidden` unless the caller is a super admin.
    pub fn require_super_admin(&self) -> AppResult<()> {
        if self.is_super_admin() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "{} is not a super admin",
            self.subject_label()
        )))
    }

    fn subject_label(&self) -> String {
        self.identity()
            .map(|identity| format!("identity '{}'", identity.id()))
            .unwrap_or_else(|| "anonymous caller".to_owned())
    }
}
