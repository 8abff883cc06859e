//! Extractors for authentication and power-based access control.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. [`auth::bearer_claims`] verifies the token; any failure counts as "no claims"
//! 3. [`auth::AuthAdmin`] requires the administrator role indicator
//! 4. Power extractors load the caller's account and check the required power
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthAdmin, RequireAdminManage};
//!
//! // Any administrator
//! async fn info(admin: AuthAdmin) -> impl IntoResponse { /* ... */ }
//!
//! // Administrators holding admin management
//! async fn create(RequireAdminManage(caller): RequireAdminManage) -> impl IntoResponse {
//!     /* ... */
//! }
//! ```

pub mod auth;
