use axum::Json;
use axum::extract::{Extension, Path};
use openbook_application::PermissionFacade;
use openbook_core::AppError;

use crate::dto::{ModuleResponse, PermissionCheckResponse};
use crate::error::ApiResult;

pub async fn list_modules_handler(
    Extension(facade): Extension<PermissionFacade>,
) -> ApiResult<Json<Vec<ModuleResponse>>> {
    facade.require_authenticated()?;

    Ok(Json(
        facade
            .accessible_modules()
            .into_iter()
            .map(|module| ModuleResponse::for_caller(module, &facade))
            .collect(),
    ))
}

pub async fn get_module_handler(
    Extension(facade): Extension<PermissionFacade>,
    Path(module_code): Path<String>,
) -> ApiResult<Json<ModuleResponse>> {
    facade.require_authenticated()?;

    // Inaccessible modules are indistinguishable from unknown ones.
    let module = facade
        .get_module(module_code.as_str())
        .ok_or_else(|| AppError::NotFound(format!("module '{module_code}' not found")))?;

    Ok(Json(ModuleResponse::for_caller(module, &facade)))
}

pub async fn check_permission_handler(
    Extension(facade): Extension<PermissionFacade>,
    Path(permission_code): Path<String>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    facade.require_authenticated()?;

    Ok(Json(PermissionCheckResponse::for_caller(
        permission_code.as_str(),
        &facade,
    )))
}
