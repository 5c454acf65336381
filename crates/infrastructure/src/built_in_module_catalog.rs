use async_trait::async_trait;
use openbook_application::ModuleCatalog;
use openbook_core::AppResult;
use openbook_domain::{Module, ModuleAction};

const CRUD_ACTIONS: &[(&str, &str)] = &[
    ("read", "Ver"),
    ("create", "Crear"),
    ("update", "Editar"),
    ("delete", "Eliminar"),
];

struct ModuleSeed {
    code: &'static str,
    label: &'static str,
    entity_name: &'static str,
    actions: &'static [(&'static str, &'static str)],
}

const MODULES: &[ModuleSeed] = &[
    ModuleSeed {
        code: "users",
        label: "Usuarios",
        entity_name: "user",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "copropiedades",
        label: "Copropiedades",
        entity_name: "copropiedad",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "properties",
        label: "Propiedades",
        entity_name: "property",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "apartments",
        label: "Apartamentos",
        entity_name: "apartment",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "goals",
        label: "Metas",
        entity_name: "goal",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "commitments",
        label: "Compromisos",
        entity_name: "commitment",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "aportes",
        label: "Aportes",
        entity_name: "aporte",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "activities",
        label: "Actividades",
        entity_name: "activity",
        actions: CRUD_ACTIONS,
    },
    ModuleSeed {
        code: "notifications",
        label: "Notificaciones",
        entity_name: "notification",
        actions: &[("read", "Ver"), ("create", "Enviar")],
    },
    ModuleSeed {
        code: "audits",
        label: "Auditoría",
        entity_name: "audit",
        actions: &[("read", "Ver")],
    },
    ModuleSeed {
        code: "reportes",
        label: "Reportes",
        entity_name: "reporte",
        actions: &[("read", "Ver"), ("export", "Exportar")],
    },
];

/// The module set OpenBook ships with, mounted under `/dashboard`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltInModuleCatalog;

impl BuiltInModuleCatalog {
    /// Creates the built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn modules() -> AppResult<Vec<Module>> {
        MODULES
            .iter()
            .zip(1..)
            .map(|(seed, navigation_order)| {
                let actions = seed
                    .actions
                    .iter()
                    .map(|(code, label)| ModuleAction::new(*code, *label))
                    .collect::<AppResult<Vec<_>>>()?;

                Module::new(
                    seed.code,
                    seed.label,
                    format!("/dashboard/{}", seed.code),
                    seed.entity_name,
                    navigation_order,
                    actions,
                )
            })
            .collect()
    }
}

#[async_trait]
impl ModuleCatalog for BuiltInModuleCatalog {
    async fn load_modules(&self) -> AppResult<Vec<Module>> {
        Self::modules()
    }
}

#[cfg(test)]
mod tests {
    use openbook_application::ModuleRegistry;

    use super::BuiltInModuleCatalog;

    #[tokio::test]
    async fn built_in_catalog_builds_a_valid_registry() {
        let registry = ModuleRegistry::load(&BuiltInModuleCatalog::new()).await;
        let Ok(registry) = registry else {
            panic!("built-in catalog should be valid");
        };

        assert_eq!(registry.list_modules().len(), 11);
        assert_eq!(
            registry.list_modules().first().map(|module| module.code().as_str()),
            Some("users")
        );
        assert_eq!(
            registry
                .get_module("aportes")
                .map(|module| module.navigation_path()),
            Some("/dashboard/aportes")
        );
        assert!(
            registry
                .permission_codes()
                .iter()
                .any(|code| code.to_string() == "reportes:export")
        );
    }
}
