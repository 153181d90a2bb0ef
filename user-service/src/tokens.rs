use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use common_auth::{Role, UserId};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::models::User;

pub struct TokenConfig {
    pub ttl_seconds: i64,
}

/// Signs access tokens with the process-wide symmetric secret loaded at
/// startup. The signer holds no per-request state.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    config: TokenConfig,
}

pub struct TokenSubject {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub token_type: &'static str,
}

impl TokenSigner {
    pub fn new(secret: &[u8], config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            config,
        }
    }

    pub fn issue(&self, subject: TokenSubject) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.ttl_seconds);

        let claims = AccessClaims {
            sub: subject.user_id.to_string(),
            email: &subject.email,
            roles: subject.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| anyhow!("Failed to sign access token: {err}"))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
            expires_in: self.config.ttl_seconds,
            token_type: "Bearer",
        })
    }
}

// The wire claim is named "roles" but carries the single role snapshotted
// at issuance.
#[derive(Serialize)]
struct AccessClaims<'a> {
    sub: String,
    email: &'a str,
    roles: Role,
    iat: i64,
    exp: i64,
}
