use crate::error::AppError;

/// Hashes `password` with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Checks `password` against a stored hash. A malformed stored hash counts
/// as a mismatch rather than an error so login reports `InvalidCredentials`.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match bcrypt::verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("stored password hash could not be checked: {}", e);
            false
        }
    }
}
