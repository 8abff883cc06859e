use axum::extract::State;
use tracing::{error, instrument};

use labsys_auth::Challenge;
use labsys_core::{ApiResponse, AppError};
use labsys_models::{
    AdminInfoResponse, AdminItem, AdminListParams, AdminListResponse, CreateAdminDto,
    LoginRequest, LoginResponse,
};

use crate::middleware::auth::{AuthAdmin, RequireAdminManage};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/admin/captcha",
    responses(
        (status = 200, description = "Verification challenge issued", body = Challenge)
    ),
    tag = "Admins"
)]
#[instrument(skip(state))]
pub async fn issue_captcha(
    State(state): State<AppState>,
) -> Result<ApiResponse<Challenge>, AppError> {
    Ok(ApiResponse::ok(state.admins.issue_challenge()))
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid parameters or credentials")
    ),
    tag = "Admins"
)]
#[instrument(skip(state, dto), fields(user_name = %dto.user_name))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let response = state.admins.login(dto).await?;
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/admin/info",
    responses(
        (status = 200, description = "Profile of the calling admin", body = AdminInfoResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not an administrator")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_info(
    State(state): State<AppState>,
    auth_admin: AuthAdmin,
) -> Result<ApiResponse<AdminInfoResponse>, AppError> {
    let Some(admin) = state.admins.query_by_id(auth_admin.id).await? else {
        error!(admin_id = %auth_admin.id, "token refers to a missing admin");
        return Err(AppError::system(anyhow::anyhow!(
            "admin {} from a valid token was not found",
            auth_admin.id
        )));
    };

    Ok(ApiResponse::ok(AdminInfoResponse::from(&admin)))
}

#[utoipa::path(
    post,
    path = "/api/admin/list",
    request_body = AdminListParams,
    responses(
        (status = 200, description = "One page of admins", body = AdminListResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires admin management")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller))]
pub async fn list_admins(
    State(state): State<AppState>,
    RequireAdminManage(_caller): RequireAdminManage,
    ValidatedJson(params): ValidatedJson<AdminListParams>,
) -> Result<ApiResponse<AdminListResponse>, AppError> {
    let page = state.admins.list(params).await?;
    Ok(ApiResponse::ok(AdminListResponse::from(page)))
}

#[utoipa::path(
    post,
    path = "/api/admin/create",
    request_body = CreateAdminDto,
    responses(
        (status = 200, description = "Admin created", body = AdminItem),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Requires admin management")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, caller, dto), fields(caller_id = %caller.id, name = %dto.name))]
pub async fn create_admin(
    State(state): State<AppState>,
    RequireAdminManage(caller): RequireAdminManage,
    ValidatedJson(dto): ValidatedJson<CreateAdminDto>,
) -> Result<ApiResponse<AdminItem>, AppError> {
    let admin = state.admins.create(caller.id, dto).await?;
    Ok(ApiResponse::ok(AdminItem::from(&admin)))
}
