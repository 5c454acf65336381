use openbook_core::AppError;
use tracing::info;

use crate::PermissionFacade;

/// Capability a guarded page entry point requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRequirement {
    /// Any authenticated identity.
    Authenticated,
    /// Access to a module.
    Module(String),
    /// A `<module>:<action>` permission.
    Permission(String),
    /// The super-admin flag.
    SuperAdmin,
}

/// Flow-control decision for a guarded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the page.
    Allowed,
    /// Redirect to the page's fallback.
    Forbidden {
        /// Fallback location.
        redirect_to: String,
    },
    /// Redirect to the login page.
    Unauthenticated {
        /// Login location.
        redirect_to: String,
    },
}

/// Adapts facade decisions to page-level redirects.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    dashboard_path: String,
}

impl RouteGuard {
    /// Creates a guard with the login and generic dashboard locations.
    #[must_use]
    pub fn new(login_path: impl Into<String>, dashboard_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            dashboard_path: dashboard_path.into(),
        }
    }

    /// Returns the fallback for pages nested under a module: its list page
    /// when the caller can see it, otherwise the dashboard.
    #[must_use]
    pub fn module_fallback(&self, facade: &PermissionFacade, module_code: &str) -> String {
        facade
            .get_module(module_code)
            .map(|module| module.navigation_path().to_owned())
            .unwrap_or_else(|| self.dashboard_path.clone())
    }

    /// Checks a requirement; `fallback` defaults to the dashboard.
    #[must_use]
    pub fn check(
        &self,
        facade: &PermissionFacade,
        requirement: &GuardRequirement,
        fallback: Option<&str>,
    ) -> GuardOutcome {
        if !facade.is_authenticated() {
            return GuardOutcome::Unauthenticated {
                redirect_to: self.login_path.clone(),
            };
        }

        let decision = match requirement {
            GuardRequirement::Authenticated => Ok(()),
            GuardRequirement::Module(code) => facade.require_module(code),
            GuardRequirement::Permission(code) => facade.require_permission(code),
            GuardRequirement::SuperAdmin => facade.require_super_admin(),
        };

        match decision {
            Ok(()) => GuardOutcome::Allowed,
            Err(AppError::Unauthorized(_)) => GuardOutcome::Unauthenticated {
                redirect_to: self.login_path.clone(),
            },
            Err(error) => {
                let redirect_to = fallback.unwrap_or(self.dashboard_path.as_str()).to_owned();
                info!(%error, %redirect_to, "guard denied page access");
                GuardOutcome::Forbidden { redirect_to }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use openbook_core::Identity;
    use openbook_domain::{
        AccessGrants, GrantOrigin, Module, ModuleAccessGrant, ModuleAction, ModuleCode,
        SessionPermissionSnapshot,
    };

    use super::{GuardOutcome, GuardRequirement, RouteGuard};
    use crate::{AccessResolver, ModuleRegistry, PermissionFacade};

    fn registry() -> Arc<ModuleRegistry> {
        let actions = ["read", "create"]
            .iter()
            .filter_map(|action| ModuleAction::new(*action, *action).ok())
            .collect::<Vec<_>>();
        let modules = vec![
            Module::new("goals", "Metas", "/dashboard/goals", "goal", 1, actions.clone()),
            Module::new("users", "Usuarios", "/dashboard/users", "user", 2, actions),
        ]
        .into_iter()
        .filter_map(Result::ok)
        .collect();

        Arc::new(ModuleRegistry::new(modules).unwrap_or_default())
    }

    fn guard() -> RouteGuard {
        RouteGuard::new("/login", "/dashboard")
    }

    fn goals_only() -> PermissionFacade {
        let identity = Identity::new("u-3", "res@openbook.co", "Res", "Ident", false, true);
        let grants = AccessGrants {
            modules: vec![ModuleAccessGrant::new(
                ModuleCode::new("goals").unwrap_or_else(|_| unreachable!("valid module code")),
                GrantOrigin::direct(),
                None,
            )],
            ..AccessGrants::default()
        };
        PermissionFacade::new(
            AccessResolver::resolve_grants(identity, &grants, Utc::now()),
            registry(),
        )
    }

    #[test]
    fn anonymous_callers_are_sent_to_login() {
        let facade = PermissionFacade::anonymous(registry());
        let outcome = guard().check(&facade, &GuardRequirement::SuperAdmin, None);
        assert_eq!(
            outcome,
            GuardOutcome::Unauthenticated {
                redirect_to: "/login".to_owned()
            }
        );
    }

    #[test]
    fn missing_module_redirects_to_dashboard() {
        let outcome = guard().check(
            &goals_only(),
            &GuardRequirement::Module("users".to_owned()),
            None,
        );
        assert_eq!(
            outcome,
            GuardOutcome::Forbidden {
                redirect_to: "/dashboard".to_owned()
            }
        );
    }

    #[test]
    fn missing_permission_redirects_to_module_list() {
        let facade = goals_only();
        let guard = guard();
        let fallback = guard.module_fallback(&facade, "goals");
        let outcome = guard.check(
            &facade,
            &GuardRequirement::Permission("goals:create".to_owned()),
            Some(fallback.as_str()),
        );
        assert_eq!(
            outcome,
            GuardOutcome::Forbidden {
                redirect_to: "/dashboard/goals".to_owned()
            }
        );
    }

    #[test]
    fn granted_module_is_allowed() {
        let outcome = guard().check(
            &goals_only(),
            &GuardRequirement::Module("goals".to_owned()),
            None,
        );
        assert_eq!(outcome, GuardOutcome::Allowed);
    }

    #[test]
    fn super_admin_requirement_allows_super_admins_only() {
        let guard = guard();
        assert!(matches!(
            guard.check(&goals_only(), &GuardRequirement::SuperAdmin, None),
            GuardOutcome::Forbidden { .. }
        ));

        let registry = registry();
        let admin = Identity::new("root", "root@openbook.co", "Root", "", true, true);
        let facade = PermissionFacade::new(
            SessionPermissionSnapshot::super_admin(admin, registry.list_modules(), Utc::now()),
            registry,
        );
        assert_eq!(
            guard.check(&facade, &GuardRequirement::SuperAdmin, None),
            GuardOutcome::Allowed
        );
    }

    #[test]
    fn module_fallback_uses_dashboard_for_hidden_modules() {
        let facade = goals_only();
        assert_eq!(guard().module_fallback(&facade, "users"), "/dashboard");
    }
}
