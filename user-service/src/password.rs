use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum PasswordError {
    // The message is all a caller ever learns; the plaintext stays out of
    // every error path.
    #[error("could not create credential")]
    Hash,
    #[error("hashing worker failed")]
    Worker,
}

/// Salted argon2 digest. The digest string records its own parameters, so
/// the cost can be tuned later without invalidating stored digests.
pub fn hash_blocking(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// True iff the plaintext re-hashes to the digest under the digest's own
/// parameters. The comparison itself happens inside the argon2 verifier,
/// which does not short-circuit on mismatch position.
pub fn verify_blocking(password: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hashing is CPU-bound and deliberately expensive; run it on the blocking
/// pool so concurrent logins do not serialize behind each other on the
/// request loop.
pub async fn hash(password: String) -> Result<String, PasswordError> {
    task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|_| PasswordError::Worker)?
}

pub async fn verify(password: String, digest: String) -> Result<bool, PasswordError> {
    task::spawn_blocking(move || verify_blocking(&password, &digest))
        .await
        .map_err(|_| PasswordError::Worker)
}
