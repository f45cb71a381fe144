//! bcrypt hashing. Both operations are CPU-bound and run on the blocking pool
//! so they don't stall other in-flight requests.

use crate::error::AppError;

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    match tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await {
        Ok(Ok(hash)) => Ok(hash),
        Ok(Err(e)) => Err(AppError::Internal(format!("failed to hash password: {e}"))),
        Err(e) => Err(AppError::Internal(format!(
            "spawn_blocking panic during hash: {e}"
        ))),
    }
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}
