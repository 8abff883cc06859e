use anyhow::Context;
use bcrypt::{hash, verify};

use crate::errors::AppError;

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .context("Failed to hash password")
        .map_err(AppError::system)
}

/// A malformed stored hash is a system fault, not a credential mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .context("Failed to verify password")
        .map_err(AppError::system)
}
