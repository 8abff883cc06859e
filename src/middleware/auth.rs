use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{error, warn};

use labsys_auth::{Claims, Role, authorize, authorize_power, verify_token};
use labsys_config::JwtConfig;
use labsys_core::{AppError, Power};
use labsys_models::{Admin, AdminId};

use crate::modules::admins::AdminDirectory;
use crate::state::AppState;

/// Claims of the bearer token, or `None` when the header is missing,
/// malformed, or carries an invalid or expired token.
pub fn bearer_claims(parts: &Parts, jwt_config: &JwtConfig) -> Option<Claims> {
    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))?;

    match verify_token(token, jwt_config) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(error = %e.error, "rejected bearer token");
            None
        }
    }
}

/// An authenticated caller holding the administrator role.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: AdminId,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims =
            bearer_claims(parts, state.jwt_config()).ok_or_else(AppError::unauthenticated)?;
        let id = authorize(&claims, Role::Administrator).map_err(|e| e.into_app_error())?;

        Ok(AuthAdmin { id, claims })
    }
}

/// Runs both access gates: role, then the caller's stored powers. Missing
/// claims fail as unauthenticated.
///
/// A token naming an account that no longer exists is a system exception,
/// not an authentication failure.
pub async fn authorize_capability(
    claims: Option<&Claims>,
    power: Power,
    directory: &AdminDirectory,
) -> Result<Admin, AppError> {
    let claims = claims.ok_or_else(AppError::unauthenticated)?;
    let id = authorize(claims, Role::Administrator).map_err(|e| e.into_app_error())?;

    let Some(admin) = directory.query_by_id(id).await? else {
        error!(admin_id = %id, "token refers to a missing admin");
        return Err(AppError::system(anyhow::anyhow!(
            "admin {id} from a valid token was not found"
        )));
    };

    authorize_power(admin.power, power).map_err(|e| e.into_app_error())?;

    Ok(admin)
}

/// Declares an extractor that admits only administrators holding `$power`.
/// The extractor carries the caller's stored account.
#[macro_export]
macro_rules! require_power {
    ($name:ident, $power:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub labsys_models::Admin);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = labsys_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let claims = $crate::middleware::auth::bearer_claims(parts, state.jwt_config());
                let admin = $crate::middleware::auth::authorize_capability(
                    claims.as_ref(),
                    $power,
                    &state.admins,
                )
                .await?;

                Ok($name(admin))
            }
        }
    };
}

require_power!(RequireAdminManage, labsys_core::Power::AdminManage);
require_power!(RequireTeacherManage, labsys_core::Power::TeacherManage);
require_power!(RequireClassManage, labsys_core::Power::ClassManage);
require_power!(RequireUserManage, labsys_core::Power::UserManage);
