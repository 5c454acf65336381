mod access;
mod caches;

use std::sync::Arc;

use openbook_application::{AccessResolver, RouteGuard};
use openbook_core::AppResult;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub async fn build_app_state(config: &ApiConfig) -> AppResult<AppState> {
    let registry = Arc::new(access::build_module_registry(config).await?);
    let directory = access::build_access_directory(config).await?;

    let mut access_resolver = AccessResolver::new(directory, registry);
    if let Some(cache) = caches::build_snapshot_cache(config)? {
        info!(
            ttl_seconds = config.snapshot_cache_ttl_seconds,
            "session snapshot cache enabled"
        );
        access_resolver = access_resolver.with_cache(cache, config.snapshot_cache_ttl_seconds);
    }

    Ok(AppState {
        access_resolver,
        route_guard: RouteGuard::new(
            config.login_path.as_str(),
            config.dashboard_path.as_str(),
        ),
        session_cookie_name: config.session_cookie_name.clone(),
    })
}
