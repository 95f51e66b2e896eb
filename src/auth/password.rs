//! Password hashing
//!
//! bcrypt embeds its salt in the output, so a stored hash is self-contained.
//! Hashing is CPU-bound and runs on the blocking thread pool.

use crate::error::Result;

pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Hash a password with a freshly generated salt
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Check a password against a stored hash.
///
/// A malformed stored hash is a failed match, not an error.
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();

    match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::debug!("Stored password hash rejected: {}", e);
            false
        }
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}
