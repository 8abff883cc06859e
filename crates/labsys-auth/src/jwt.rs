//! Access token creation and verification.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`. They carry the account id
//! and role indicator (see [`Claims`]) and expire after
//! `JWT_ACCESS_EXPIRY` seconds.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use labsys_config::JwtConfig;
use labsys_core::AppError;
use labsys_models::AdminId;

use crate::claims::{Claims, Role};

/// Creates an access token for an account.
///
/// # Errors
///
/// Returns a system error if token encoding fails.
pub fn create_access_token(
    account_id: AdminId,
    role: Role,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: account_id.into_inner(),
        rid: role.indicator(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AppError::system)
}

/// Verifies an access token and returns its claims.
///
/// # Errors
///
/// Returns `Unauthenticated` when the signature is invalid, the token has
/// expired or it is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthenticated())
}
