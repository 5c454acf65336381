use std::collections::HashMap;

use openbook_core::{AppError, AppResult};
use openbook_domain::{Module, PermissionCode};

use crate::ModuleCatalog;

/// Canonical, ordered catalog of configured modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Builds a registry, ordering modules by navigation order then code.
    pub fn new(modules: Vec<Module>) -> AppResult<Self> {
        let mut sorted_modules = modules;
        sorted_modules.sort_by(|left, right| {
            left.navigation_order()
                .cmp(&right.navigation_order())
                .then_with(|| left.code().cmp(right.code()))
        });

        let mut index = HashMap::with_capacity(sorted_modules.len());
        for (position, module) in sorted_modules.iter().enumerate() {
            if index
                .insert(module.code().as_str().to_owned(), position)
                .is_some()
            {
                return Err(AppError::Validation(format!(
                    "module '{}' is registered more than once",
                    module.code()
                )));
            }
        }

        Ok(Self {
            modules: sorted_modules,
            index,
        })
    }

    /// Loads and validates the registry from a catalog.
    pub async fn load(catalog: &dyn ModuleCatalog) -> AppResult<Self> {
        let modules = catalog.load_modules().await?;
        let registry = Self::new(modules)?;
        tracing::info!(modules = registry.modules.len(), "module registry loaded");
        Ok(registry)
    }

    /// Returns module metadata; absence means the feature is not configured.
    #[must_use]
    pub fn get_module(&self, code: &str) -> Option<&Module> {
        self.index
            .get(code)
            .and_then(|position| self.modules.get(*position))
    }

    /// Returns all modules in navigation order.
    #[must_use]
    pub fn list_modules(&self) -> &[Module] {
        &self.modules
    }

    /// Returns every declared `<module>:<action>` permission code.
    #[must_use]
    pub fn permission_codes(&self) -> Vec<PermissionCode> {
        self.modules
            .iter()
            .flat_map(|module| {
                module.actions().iter().filter_map(|action| {
                    PermissionCode::new(module.code().clone(), action.code()).ok()
                })
            })
            .collect()
    }
}
