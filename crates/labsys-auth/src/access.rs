//! Access control predicates.
//!
//! A privileged request passes two gates once its bearer token is verified.
//! [`authorize`] checks the token's role. [`authorize_power`] checks that the
//! caller's power set contains the capability the operation needs. Both are
//! pure; the lookup of the caller's powers sits between them, in the request
//! extractors.

use std::fmt;

use labsys_core::{AppError, Power, PowerSet};
use labsys_models::AdminId;

use crate::claims::{Claims, Role};

/// Why an authenticated caller was denied.
///
/// Not a `std::error::Error`, so `?` cannot turn it into a system exception.
/// Convert with [`AccessError::into_app_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    WrongRole { required: Role, rid: i32 },
    MissingPower(Power),
}

impl AccessError {
    pub fn into_app_error(self) -> AppError {
        AppError::forbidden(self.to_string())
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::WrongRole { required, rid } => {
                write!(f, "role indicator {rid} is not {required:?}")
            }
            AccessError::MissingPower(power) => write!(f, "missing power: {power}"),
        }
    }
}

/// Checks the verified claims carry `role` and returns the caller's id.
pub fn authorize(claims: &Claims, role: Role) -> Result<AdminId, AccessError> {
    if claims.rid != role.indicator() {
        return Err(AccessError::WrongRole {
            required: role,
            rid: claims.rid,
        });
    }
    Ok(AdminId(claims.sub))
}

pub fn authorize_power(owned: PowerSet, power: Power) -> Result<(), AccessError> {
    if owned.own(power) {
        Ok(())
    } else {
        Err(AccessError::MissingPower(power))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsys_core::ErrorCode;

    fn claims(rid: i32) -> Claims {
        Claims {
            sub: 11,
            rid,
            exp: usize::MAX,
            iat: 0,
        }
    }

    #[test]
    fn test_authorize_wrong_role_is_forbidden() {
        let teacher = claims(Role::Teacher.indicator());
        assert_eq!(
            authorize(&teacher, Role::Administrator),
            Err(AccessError::WrongRole {
                required: Role::Administrator,
                rid: 2
            })
        );
    }

    #[test]
    fn test_authorize_matching_role_yields_id() {
        let admin = claims(Role::Administrator.indicator());
        assert_eq!(authorize(&admin, Role::Administrator), Ok(AdminId(11)));
    }

    #[test]
    fn test_authorize_power() {
        let owned = PowerSet::from_raw(0b101).unwrap();
        assert!(authorize_power(owned, Power::AdminManage).is_ok());
        assert!(authorize_power(owned, Power::ClassManage).is_ok());
        assert_eq!(
            authorize_power(owned, Power::TeacherManage),
            Err(AccessError::MissingPower(Power::TeacherManage))
        );
        assert!(authorize_power(PowerSet::EMPTY, Power::LabManage).is_err());
    }

    #[test]
    fn test_into_app_error_codes() {
        assert_eq!(
            AccessError::MissingPower(Power::UserManage).into_app_error().code,
            ErrorCode::Forbidden
        );
        let err = AccessError::WrongRole {
            required: Role::Administrator,
            rid: 3,
        }
        .into_app_error();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(err.error.to_string().contains("role indicator 3"));
    }
}
