//! Guarded page entry points.
//!
//! Each handler asks the route guard first and only assembles page data once
//! the guard allows the request; denials become redirects.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use openbook_application::{GuardOutcome, GuardRequirement, PermissionFacade};
use openbook_core::AppError;

use crate::dto::{ModuleResponse, PageKind, PageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn dashboard_page_handler(
    State(state): State<AppState>,
    Extension(facade): Extension<PermissionFacade>,
) -> ApiResult<Response> {
    let outcome = state
        .route_guard
        .check(&facade, &GuardRequirement::Authenticated, None);

    render(outcome, || {
        Ok(PageResponse {
            page: PageKind::Dashboard,
            module: None,
            record_id: None,
            section: None,
            navigation: navigation(&facade),
        })
    })
}

pub async fn module_list_page_handler(
    State(state): State<AppState>,
    Extension(facade): Extension<PermissionFacade>,
    Path(module_code): Path<String>,
) -> ApiResult<Response> {
    let outcome = state.route_guard.check(
        &facade,
        &GuardRequirement::Module(module_code.clone()),
        None,
    );

    render(outcome, || {
        module_page(&facade, PageKind::ModuleList, module_code.as_str(), None)
    })
}

pub async fn record_create_page_handler(
    State(state): State<AppState>,
    Extension(facade): Extension<PermissionFacade>,
    Path(module_code): Path<String>,
) -> ApiResult<Response> {
    let outcome = check_module_action(&state, &facade, module_code.as_str(), "create");

    render(outcome, || {
        module_page(&facade, PageKind::RecordCreate, module_code.as_str(), None)
    })
}

pub async fn record_detail_page_handler(
    State(state): State<AppState>,
    Extension(facade): Extension<PermissionFacade>,
    Path((module_code, record_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let outcome = check_module_action(&state, &facade, module_code.as_str(), "read");

    render(outcome, || {
        module_page(
            &facade,
            PageKind::RecordDetail,
            module_code.as_str(),
            Some(record_id),
        )
    })
}

pub async fn record_edit_page_handler(
    State(state): State<AppState>,
    Extension(facade): Extension<PermissionFacade>,
    Path((module_code, record_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let outcome = check_module_action(&state, &facade, module_code.as_str(), "update");

    render(outcome, || {
        module_page(
            &facade,
            PageKind::RecordEdit,
            module_code.as_str(),
            Some(record_id),
        )
    })
}

pub async fn admin_page_handler(
    State(state): State<AppState>,
    Extension(facade): Extension<PermissionFacade>,
    Path(section): Path<String>,
) -> ApiResult<Response> {
    let outcome = state
        .route_guard
        .check(&facade, &GuardRequirement::SuperAdmin, None);

    render(outcome, || {
        Ok(PageResponse {
            page: PageKind::Admin,
            module: None,
            record_id: None,
            section: Some(section),
            navigation: navigation(&facade),
        })
    })
}

/// Record pages fall back to the module's list page.
fn check_module_action(
    state: &AppState,
    facade: &PermissionFacade,
    module_code: &str,
    action: &str,
) -> GuardOutcome {
    let fallback = state.route_guard.module_fallback(facade, module_code);
    state.route_guard.check(
        facade,
        &GuardRequirement::Permission(format!("{module_code}:{action}")),
        Some(fallback.as_str()),
    )
}

fn render(
    outcome: GuardOutcome,
    page: impl FnOnce() -> ApiResult<PageResponse>,
) -> ApiResult<Response> {
    match outcome {
        GuardOutcome::Allowed => Ok(Json(page()?).into_response()),
        GuardOutcome::Forbidden { redirect_to } | GuardOutcome::Unauthenticated { redirect_to } => {
            Ok(Redirect::to(redirect_to.as_str()).into_response())
        }
    }
}

fn module_page(
    facade: &PermissionFacade,
    page: PageKind,
    module_code: &str,
    record_id: Option<String>,
) -> ApiResult<PageResponse> {
    let module = facade
        .get_module(module_code)
        .ok_or_else(|| AppError::NotFound(format!("module '{module_code}' not found")))?;

    Ok(PageResponse {
        page,
        module: Some(ModuleResponse::for_caller(module, facade)),
        record_id,
        section: None,
        navigation: navigation(facade),
    })
}

fn navigation(facade: &PermissionFacade) -> Vec<ModuleResponse> {
    facade
        .accessible_modules()
        .into_iter()
        .map(|module| ModuleResponse::for_caller(module, facade))
        .collect()
}
