//! Password hashing and verification using bcrypt.

use bcrypt::{hash, verify};

/// Work factor for new password hashes.
pub const HASH_COST: u32 = 12;

/// Well-formed hash that matches no password; used to burn a verification
/// when the username does not exist so both failure paths cost the same.
const DUMMY_HASH: &str = "$2b$12$abcdefghijklmnopqrstuvABCDEFGHIJKLMNOPQRSTUVWXYZabcde";

/// Hash a password with a random salt at the fixed work factor.
///
/// # Errors
/// Returns an error if the underlying hash computation fails.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, HASH_COST)
}

/// Verify a password against a stored hash. Mismatches and malformed stored
/// hashes both return `false`; this never errors toward the caller.
#[must_use]
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

/// Spend one hash verification against a throwaway hash so "unknown user"
/// and "wrong password" take comparable time.
pub fn equalize_timing(password: &str) {
    let _ = verify(password, DUMMY_HASH);
}
