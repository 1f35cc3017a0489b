use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chub_kernel::prelude::OperationError;

/// Argon2id digest of `password` as a PHC string.
///
/// # Errors
/// [`OperationError::Internal`] if hashing fails.
pub(crate) fn hash(password: &str) -> Result<String, OperationError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| OperationError::from(format!("failed to hash password: {e}")))?;
    Ok(digest.to_string())
}

/// Checks `password` against a PHC string produced by [`hash`]; malformed digests never match.
#[must_use]
pub(crate) fn verify(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
