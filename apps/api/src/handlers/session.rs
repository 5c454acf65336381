use axum::Json;
use axum::extract::Extension;
use openbook_application::PermissionFacade;
use openbook_core::AppError;

use crate::dto::SessionResponse;
use crate::error::ApiResult;

pub async fn me_handler(
    Extension(facade): Extension<PermissionFacade>,
) -> ApiResult<Json<SessionResponse>> {
    facade.require_authenticated()?;

    SessionResponse::from_snapshot(facade.snapshot())
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()).into())
}
