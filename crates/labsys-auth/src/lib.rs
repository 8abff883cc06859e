//! # labsys Auth
//!
//! Authentication and authorization building blocks for the labsys API.
//!
//! - [`claims`]: JWT claims and caller roles
//! - [`jwt`]: Access token creation and verification
//! - [`access`]: Role and power checks
//! - [`cipher`]: Decryption of RSA encrypted credentials
//! - [`captcha`]: Stateless verification code challenges
//!
//! # Example
//!
//! ```ignore
//! use labsys_auth::{access, create_access_token, verify_token, Role};
//! use labsys_core::Power;
//!
//! let token = create_access_token(admin.id, Role::Administrator, &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//!
//! let id = access::authorize(&claims, Role::Administrator)?;
//! access::authorize_power(admin.power, Power::AdminManage)?;
//! ```

pub mod access;
pub mod captcha;
pub mod cipher;
pub mod claims;
pub mod jwt;

pub use access::{AccessError, authorize, authorize_power};
pub use captcha::{Challenge, Disabled, SignedCodes, VerificationCodes};
pub use cipher::{CipherError, CredentialCipher, RsaCipher};
pub use claims::{Claims, Role};
pub use jwt::{create_access_token, verify_token};
