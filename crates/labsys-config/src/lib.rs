//! # labsys Config
//!
//! Configuration types for the labsys API.
//!
//! Every struct is loaded from environment variables with a `from_env()`
//! constructor and, except for the database URL, falls back to development
//! defaults:
//!
//! - [`jwt`]: access token signing
//! - [`cors`]: allowed origins
//! - [`crypto`]: RSA private key for credential transport, bcrypt cost
//! - [`captcha`]: verification code challenges
//! - [`database`]: PostgreSQL URL and pool size (required)
//! - [`server`]: listen address, logs, observability switch
//!
//! # Example
//!
//! ```ignore
//! use labsys_config::{CaptchaConfig, CorsConfig, JwtConfig};
//!
//! dotenvy::dotenv().ok();
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let captcha_config = CaptchaConfig::from_env();
//! ```

pub mod captcha;
pub mod cors;
pub mod crypto;
pub mod database;
pub mod jwt;
pub mod server;

pub use captcha::CaptchaConfig;
pub use cors::CorsConfig;
pub use crypto::CryptoConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
