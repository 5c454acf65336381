use std::sync::Arc;

use openbook_application::{AccessDirectory, ModuleCatalog, ModuleRegistry};
use openbook_core::{AppError, AppResult};
use openbook_infrastructure::{
    BuiltInModuleCatalog, HttpAccessDirectory, JsonFileModuleCatalog, StaticAccessDirectory,
};
use tracing::{info, warn};

use crate::api_config::{AccessDirectoryConfig, ApiConfig};

pub(super) async fn build_module_registry(config: &ApiConfig) -> AppResult<ModuleRegistry> {
    let catalog: Box<dyn ModuleCatalog> = match &config.module_catalog_path {
        Some(path) => {
            info!(path = %path.display(), "using module catalog file");
            Box::new(JsonFileModuleCatalog::new(path.clone()))
        }
        None => Box::new(BuiltInModuleCatalog::new()),
    };

    ModuleRegistry::load(catalog.as_ref()).await
}

pub(super) async fn build_access_directory(
    config: &ApiConfig,
) -> AppResult<Arc<dyn AccessDirectory>> {
    match &config.access_directory {
        AccessDirectoryConfig::Http { backend_api_url } => {
            let http_client = reqwest::Client::builder()
                .timeout(config.upstream_timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build upstream HTTP client: {error}"))
                })?;

            info!(%backend_api_url, "using backend access directory");
            Ok(Arc::new(HttpAccessDirectory::new(
                http_client,
                backend_api_url.clone(),
            )))
        }
        AccessDirectoryConfig::Static { path } => {
            warn!(
                path = %path.display(),
                "using static access directory; not for production"
            );
            Ok(Arc::new(StaticAccessDirectory::load(path).await?))
        }
    }
}
