use axum::extract::State;
use tracing::instrument;

use labsys_core::{ApiResponse, AppError};
use labsys_models::{ClassItem, ClassListParams, ClassListResponse, CreateClassDto};

use crate::middleware::auth::RequireClassManage;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/class/create",
    request_body = CreateClassDto,
    responses(
        (status = 200, description = "Class created", body = ClassItem),
        (status = 400, description = "Malformed or taken class number"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires class management")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller), fields(caller_id = %caller.id))]
pub async fn create_class(
    State(state): State<AppState>,
    RequireClassManage(caller): RequireClassManage,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<ApiResponse<ClassItem>, AppError> {
    let class = state.classes.create(caller.id, dto).await?;
    Ok(ApiResponse::ok(ClassItem::from(&class)))
}

#[utoipa::path(
    post,
    path = "/api/class/list",
    request_body = ClassListParams,
    responses(
        (status = 200, description = "One page of classes", body = ClassListResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires class management")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller))]
pub async fn list_classes(
    State(state): State<AppState>,
    RequireClassManage(_caller): RequireClassManage,
    ValidatedJson(params): ValidatedJson<ClassListParams>,
) -> Result<ApiResponse<ClassListResponse>, AppError> {
    let page = state.classes.list(params).await?;
    Ok(ApiResponse::ok(ClassListResponse::from(page)))
}
