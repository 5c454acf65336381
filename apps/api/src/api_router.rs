mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use openbook_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let session_routes = Router::new()
        .route("/auth/me", get(handlers::session::me_handler))
        .route("/api/modules", get(handlers::modules::list_modules_handler))
        .route(
            "/api/modules/{module_code}",
            get(handlers::modules::get_module_handler),
        )
        .route(
            "/api/permissions/{permission_code}",
            get(handlers::modules::check_permission_handler),
        )
        .route(
            "/pages/dashboard",
            get(handlers::pages::dashboard_page_handler),
        )
        .route(
            "/pages/modules/{module_code}",
            get(handlers::pages::module_list_page_handler),
        )
        .route(
            "/pages/modules/{module_code}/new",
            get(handlers::pages::record_create_page_handler),
        )
        .route(
            "/pages/modules/{module_code}/{record_id}",
            get(handlers::pages::record_detail_page_handler),
        )
        .route(
            "/pages/modules/{module_code}/{record_id}/edit",
            get(handlers::pages::record_edit_page_handler),
        )
        .route(
            "/pages/admin/{section}",
            get(handlers::pages::admin_page_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_session,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
