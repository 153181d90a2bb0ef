use thiserror::Error;

use crate::models::User;
use crate::password;
use crate::repository::{RepoError, UserRepository};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Repository(#[from] RepoError),
    #[error("credential verification unavailable")]
    VerificationUnavailable,
}

/// Verifies an email/password pair against the store. Read-only.
///
/// An unknown email and a failed comparison collapse into the same
/// `InvalidCredentials` value; the lookup returns `Option`, so no
/// not-found signal exists on this path that could leak which case
/// occurred.
pub async fn validate_credentials(
    repo: &dyn UserRepository,
    email: &str,
    password_input: &str,
) -> Result<User, CredentialError> {
    let record = match repo.find_by_email(email).await? {
        Some(record) => record,
        None => return Err(CredentialError::InvalidCredentials),
    };

    let valid = password::verify(password_input.to_owned(), record.password_hash.clone())
        .await
        .map_err(|_| CredentialError::VerificationUnavailable)?;

    if valid {
        Ok(User::from(record))
    } else {
        Err(CredentialError::InvalidCredentials)
    }
}
