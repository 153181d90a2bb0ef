use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};
use crate::ids::UserId;
use crate::roles::Role;

/// Application-focused representation of verified token claims.
///
/// The role is a snapshot taken at issuance; it is never re-checked against
/// the stored user while the token remains valid.
#[derive(Debug, Clone)]
pub struct Claims {
    pub subject: UserId,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Claims {
    /// Convenience helper for role checks.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    sub: String,
    email: String,
    // The wire claim is named "roles" but carries a single role value.
    #[serde(rename = "roles")]
    role: String,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let subject = UserId::parse(&value.sub)
            .map_err(|_| AuthError::InvalidClaim("sub", value.sub.clone()))?;
        let role = value
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidClaim("roles", value.role.clone()))?;

        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        let issued_at = match value.iat {
            Some(iat) => Some(
                Utc.timestamp_opt(iat, 0)
                    .single()
                    .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            subject,
            email: value.email,
            role,
            expires_at,
            issued_at,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr =
            serde_json::from_value(value).map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        Claims::try_from(repr)
    }
}
