use openbook_application::PermissionFacade;
use openbook_domain::{Module, ModuleAction};
use serde::Serialize;
use ts_rs::TS;

/// Declared module action.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/module-action-response.ts"
)]
pub struct ModuleActionResponse {
    pub code: String,
    pub label: String,
}

/// Module metadata as seen by the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/module-response.ts"
)]
pub struct ModuleResponse {
    pub code: String,
    pub label: String,
    pub navigation_path: String,
    pub entity_name: String,
    pub navigation_order: i32,
    pub actions: Vec<ModuleActionResponse>,
    /// Declared action codes the caller holds a permission for.
    pub allowed_actions: Vec<String>,
}

/// Answer to a single permission query.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub permission: String,
    pub allowed: bool,
    pub scope: Option<String>,
    pub copropiedad_ids: Vec<String>,
}

impl From<&ModuleAction> for ModuleActionResponse {
    fn from(action: &ModuleAction) -> Self {
        Self {
            code: action.code().to_owned(),
            label: action.label().to_owned(),
        }
    }
}

impl ModuleResponse {
    /// Builds the module view for the facade's caller.
    #[must_use]
    pub fn for_caller(module: &Module, facade: &PermissionFacade) -> Self {
        let code = module.code().as_str();

        Self {
            code: code.to_owned(),
            label: module.label().to_owned(),
            navigation_path: module.navigation_path().to_owned(),
            entity_name: module.entity_name().to_owned(),
            navigation_order: module.navigation_order(),
            actions: module
                .actions()
                .iter()
                .map(ModuleActionResponse::from)
                .collect(),
            allowed_actions: facade
                .allowed_actions(code)
                .into_iter()
                .map(|action| action.code().to_owned())
                .collect(),
        }
    }
}

impl PermissionCheckResponse {
    /// Answers `permission` for the facade's caller.
    #[must_use]
    pub fn for_caller(permission: &str, facade: &PermissionFacade) -> Self {
        let resolved = facade.permission(permission);

        Self {
            permission: permission.to_owned(),
            allowed: facade.can(permission),
            scope: resolved
                .map(|resolved| resolved.scope().as_str().to_owned())
                .or_else(|| facade.is_super_admin().then(|| "all".to_owned())),
            copropiedad_ids: resolved
                .map(|resolved| resolved.copropiedad_ids().map(ToString::to_string).collect())
                .unwrap_or_default(),
        }
    }
}
