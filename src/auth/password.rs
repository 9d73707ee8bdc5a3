//! Password Hashing
//! Mission: One-way salted hashing with failures that are loud, never silent

use anyhow::{Context, Result};
use bcrypt::DEFAULT_COST;

/// Hash a plaintext password with bcrypt (salted, slow by design).
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, DEFAULT_COST).context("Failed to hash password")
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// A library failure (e.g. a corrupt hash string) is an error, not `false`,
/// so it can never be mistaken for a wrong password.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(plain, hash).context("Failed to verify password")
}
