use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use openbook_core::SessionToken;

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller's permission facade once and attaches it to the request.
///
/// Missing or rejected sessions continue as anonymous; upstream failures
/// short-circuit with 503 before any handler runs.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = session_token(request.headers(), state.session_cookie_name.as_str());
    let facade = state.access_resolver.facade_for(token.as_ref()).await?;

    request.extensions_mut().insert(facade);
    Ok(next.run(request).await)
}

/// Reads the session token from a bearer header, falling back to a cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    bearer_token(headers).or_else(|| cookie_token(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(SessionToken::new)
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| SessionToken::new(value))
}
