//! Format checks for user supplied identifiers, names and passwords.
//!
//! Each check returns the matching [`InvalidReason`] so callers can fail
//! with `AppError::invalid_params(reason)` directly.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::InvalidReason;

/// A letter followed by 3-15 letters, digits or underscores.
static NICKNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{3,15}$").expect("nickname pattern"));

/// 8-20 printable ASCII characters, no spaces.
static PASSWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x21-\x7E]{8,20}$").expect("password pattern"));

static CLASS_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{4,16}$").expect("class number pattern"));

/// Staff or student number.
static USER_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{4,20}$").expect("user number pattern"));

/// Starts with a letter in any script, e.g. "José O'Neil" or "张伟".
static REAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{L}[\p{L}\p{M} .·'-]{0,29}$").expect("real name pattern")
});

pub fn check_nickname(nickname: &str) -> Result<(), InvalidReason> {
    if NICKNAME.is_match(nickname) {
        Ok(())
    } else {
        Err(InvalidReason::MalformedNickname)
    }
}

/// Length and charset, plus at least one letter and one digit.
pub fn check_password_strength(password: &str) -> Result<(), InvalidReason> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if PASSWORD.is_match(password) && has_letter && has_digit {
        Ok(())
    } else {
        Err(InvalidReason::WeakPassword)
    }
}

pub fn check_class_no(class_no: &str) -> Result<(), InvalidReason> {
    if CLASS_NO.is_match(class_no) {
        Ok(())
    } else {
        Err(InvalidReason::MalformedClassNo)
    }
}

pub fn check_user_no(user_no: &str) -> Result<(), InvalidReason> {
    if USER_NO.is_match(user_no) {
        Ok(())
    } else {
        Err(InvalidReason::MalformedUserNo)
    }
}

pub fn check_real_name(real_name: &str) -> Result<(), InvalidReason> {
    if REAL_NAME.is_match(real_name) {
        Ok(())
    } else {
        Err(InvalidReason::MalformedRealName)
    }
}
