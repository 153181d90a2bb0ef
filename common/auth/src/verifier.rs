use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::AuthResult;

/// Verifies bearer tokens against the single process-wide symmetric secret.
///
/// Verification is purely local: signature plus expiry, then claim
/// reconstruction. No storage lookup happens on this path.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    config: JwtConfig,
}

impl JwtVerifier {
    pub fn new(secret: &[u8], config: JwtConfig) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            config,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<Value>(token, &self.key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = %claims.subject, "verified token successfully");
        Ok(claims)
    }
}
