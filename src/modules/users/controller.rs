use axum::extract::State;
use tracing::instrument;

use labsys_core::{ApiResponse, AppError};
use labsys_models::{
    CreateTeacherDto, DeleteUsersDto, DeleteUsersResponse, UserItem, UserListParams,
    UserListResponse,
};

use crate::middleware::auth::{RequireTeacherManage, RequireUserManage};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/teacher/create",
    request_body = CreateTeacherDto,
    responses(
        (status = 200, description = "Teacher created", body = UserItem),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires teacher management")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, dto), fields(caller_id = %caller.id, user_no = %dto.user_no))]
pub async fn create_teacher(
    State(state): State<AppState>,
    RequireTeacherManage(caller): RequireTeacherManage,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<ApiResponse<UserItem>, AppError> {
    let user = state.users.create_teacher(caller.id, dto).await?;
    Ok(ApiResponse::ok(UserItem::from(&user)))
}

#[utoipa::path(
    post,
    path = "/api/user/list",
    request_body = UserListParams,
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires user management")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireUserManage(_caller): RequireUserManage,
    ValidatedJson(params): ValidatedJson<UserListParams>,
) -> Result<ApiResponse<UserListResponse>, AppError> {
    let page = state.users.list(params).await?;
    Ok(ApiResponse::ok(UserListResponse::from(page)))
}

#[utoipa::path(
    post,
    path = "/api/user/delete",
    request_body = DeleteUsersDto,
    responses(
        (status = 200, description = "Users deleted", body = DeleteUsersResponse),
        (status = 400, description = "No ids or too many ids"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires user management")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, dto), fields(caller_id = %caller.id))]
pub async fn delete_users(
    State(state): State<AppState>,
    RequireUserManage(caller): RequireUserManage,
    ValidatedJson(dto): ValidatedJson<DeleteUsersDto>,
) -> Result<ApiResponse<DeleteUsersResponse>, AppError> {
    let deleted = state.users.delete(caller.id, &dto.ids).await?;
    Ok(ApiResponse::ok(DeleteUsersResponse { deleted }))
}
