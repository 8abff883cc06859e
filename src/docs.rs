use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use labsys_auth::Challenge;
use labsys_core::{ErrorCode, PageParams, Power, PowerOwner};
use labsys_models::{
    AdminInfoResponse, AdminItem, AdminListParams, AdminListResponse, ClassItem, ClassListParams,
    ClassListResponse, CreateAdminDto, CreateClassDto, CreateTeacherDto, DeleteUsersDto,
    DeleteUsersResponse, LoginRequest, LoginResponse, UserItem, UserListParams, UserListResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::admins::controller::issue_captcha,
        crate::modules::admins::controller::login,
        crate::modules::admins::controller::get_info,
        crate::modules::admins::controller::list_admins,
        crate::modules::admins::controller::create_admin,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::list_classes,
        crate::modules::users::controller::create_teacher,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::delete_users,
    ),
    components(
        schemas(
            Challenge,
            ErrorCode,
            PageParams,
            Power,
            PowerOwner,
            LoginRequest,
            LoginResponse,
            AdminInfoResponse,
            AdminItem,
            AdminListParams,
            AdminListResponse,
            CreateAdminDto,
            ClassItem,
            ClassListParams,
            ClassListResponse,
            CreateClassDto,
            CreateTeacherDto,
            DeleteUsersDto,
            DeleteUsersResponse,
            UserItem,
            UserListParams,
            UserListResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admins", description = "Admin login, profile, listing and creation"),
        (name = "Classes", description = "Class creation and listing"),
        (name = "Users", description = "Teacher creation, user listing and deletion"),
    ),
    info(
        title = "labsys API",
        version = "0.1.0",
        description = "Administrative backend of the lab management system. Every response is an `{error_code, message, data}` envelope.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
