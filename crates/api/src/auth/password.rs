//! Profile password storage.
//!
//! Stored hashes are Argon2id PHC strings; the salt and cost parameters live
//! inside the string, so `profiles.password_hash` is the only column needed.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash checked when a login names no known profile.
static PLACEHOLDER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("backdrop-placeholder-password").ok());

/// Hash a new or changed profile password.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a login attempt against a stored hash.
///
/// A mismatch is `Ok(false)`; `Err` means the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let stored = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run one verification against a placeholder hash for a login whose email
/// matched nothing, so unknown and known emails take the same time to refuse.
pub fn verify_unknown_profile(password: &str) {
    if let Some(hash) = PLACEHOLDER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
