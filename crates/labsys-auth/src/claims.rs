//! JWT claims carried by access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of account a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Administrator,
    Teacher,
    Student,
}

impl Role {
    /// The integer stored in the `rid` claim.
    #[must_use]
    pub const fn indicator(self) -> i32 {
        match self {
            Role::Administrator => 1,
            Role::Teacher => 2,
            Role::Student => 3,
        }
    }

    #[must_use]
    pub const fn from_indicator(rid: i32) -> Option<Role> {
        match rid {
            1 => Some(Role::Administrator),
            2 => Some(Role::Teacher),
            3 => Some(Role::Student),
            _ => None,
        }
    }
}

/// JWT claims for access tokens.
///
/// Only identity and role travel in the token. Powers are looked up on every
/// privileged request so that revoking a power takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account id (subject claim)
    pub sub: i64,
    /// Role indicator, see [`Role::indicator`]
    pub rid: i32,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::from_indicator(self.rid)
    }
}
