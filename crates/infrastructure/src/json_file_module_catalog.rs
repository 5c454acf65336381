use std::path::PathBuf;

use async_trait::async_trait;
use openbook_application::ModuleCatalog;
use openbook_core::{AppError, AppResult};
use openbook_domain::{Module, ModuleAction};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ModuleCatalogFile {
    modules: Vec<ModulePayload>,
}

#[derive(Debug, Deserialize)]
struct ModulePayload {
    code: String,
    label: String,
    navigation_path: String,
    entity_name: String,
    #[serde(default)]
    navigation_order: i32,
    #[serde(default)]
    actions: Vec<ModuleActionPayload>,
}

#[derive(Debug, Deserialize)]
struct ModuleActionPayload {
    code: String,
    #[serde(default)]
    label: Option<String>,
}

/// Module catalog read from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileModuleCatalog {
    path: PathBuf,
}

impl JsonFileModuleCatalog {
    /// Creates a catalog backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(json: &str) -> AppResult<Vec<Module>> {
        let file: ModuleCatalogFile = serde_json::from_str(json)
            .map_err(|error| AppError::Validation(format!("invalid module catalog: {error}")))?;

        file.modules
            .into_iter()
            .map(|module| {
                let actions = module
                    .actions
                    .into_iter()
                    .map(|action| {
                        let label = action.label.unwrap_or_else(|| action.code.clone());
                        ModuleAction::new(action.code, label)
                    })
                    .collect::<AppResult<Vec<_>>>()?;

                Module::new(
                    module.code,
                    module.label,
                    module.navigation_path,
                    module.entity_name,
                    module.navigation_order,
                    actions,
                )
            })
            .collect()
    }
}

#[async_trait]
impl ModuleCatalog for JsonFileModuleCatalog {
    async fn load_modules(&self) -> AppResult<Vec<Module>> {
        let json = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read module catalog '{}': {error}",
                self.path.display()
            ))
        })?;

        Self::parse(json.as_str())
    }
}
