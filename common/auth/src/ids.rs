use std::fmt;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ID_BYTES: usize = 12;
const ID_CHARS: usize = ID_BYTES * 2;

/// Identifier for a stored user: 24 lowercase hex characters.
///
/// Parsing accepts mixed case and normalises; anything that is not exactly
/// 24 hex characters is rejected before it can reach a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

#[derive(Debug, Error)]
#[error("Invalid user ID format")]
pub struct InvalidUserId;

impl UserId {
    pub fn parse(value: &str) -> Result<Self, InvalidUserId> {
        if value.len() != ID_CHARS {
            return Err(InvalidUserId);
        }
        hex::decode(value).map_err(|_| InvalidUserId)?;
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}
