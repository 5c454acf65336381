use openbook_application::{AccessResolver, RouteGuard};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_resolver: AccessResolver,
    pub route_guard: RouteGuard,
    pub session_cookie_name: String,
}
