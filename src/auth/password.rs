//! bcrypt hashing on the blocking pool, bounded by a timeout.

use std::time::Duration;

use super::AuthError;

pub async fn hash_password(password: &str, cost: u32, timeout: Duration) -> Result<String, AuthError> {
    let password = password.to_string();
    run_blocking(timeout, move || bcrypt::hash(password, cost)).await
}

/// `Ok(false)` on mismatch; malformed stored hashes are errors
pub async fn verify_password(password: &str, hash: &str, timeout: Duration) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    run_blocking(timeout, move || bcrypt::verify(password, &hash)).await
}

async fn run_blocking<T, F>(timeout: Duration, work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(join_error)) => Err(AuthError::Task(join_error.to_string())),
        Err(_) => Err(AuthError::Timeout(timeout)),
    }
}
