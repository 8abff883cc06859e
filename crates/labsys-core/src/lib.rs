//! # labsys Core
//!
//! Core types, errors, and utilities for the labsys API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page/page-size handling for list endpoints
//! - [`password`]: bcrypt password hashing and verification
//! - [`patterns`]: Format checks for user names, user numbers, real names,
//!   passwords and class numbers
//! - [`permissions`]: The power catalog and the [`PowerSet`] bitset codec
//! - [`response`]: The `{error_code, message, data}` response envelope
//!
//! # Example
//!
//! ```ignore
//! use labsys_core::{AppError, Power, PowerSet};
//!
//! let powers = PowerSet::from_raw(3)?;
//! assert!(powers.own(Power::AdminManage));
//! assert!(!powers.own(Power::ClassManage));
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod patterns;
pub mod permissions;
pub mod response;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorCode, InvalidReason};
pub use pagination::PageParams;
pub use password::{hash_password_with_cost, verify_password};
pub use permissions::{InvalidCapability, Power, PowerOwner, PowerSet};
pub use response::ApiResponse;
