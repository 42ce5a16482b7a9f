//! One-way hashing for admin passwords and customer access codes.

use thiserror::Error;

pub use bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
#[error("hashing failed: {0}")]
pub struct HashError(#[from] bcrypt::BcryptError);

pub fn hash(secret: &str, cost: u32) -> Result<String, HashError> {
    Ok(bcrypt::hash(secret, cost)?)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify(secret: &str, hash: &str) -> bool {
    bcrypt::verify(secret, hash).unwrap_or(false)
}
