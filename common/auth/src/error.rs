use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("token verification failed: {0}")]
    Verification(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Every failure mode here means the caller is unauthenticated; a
        // malformed token earns no more detail than a missing one.
        let code = match &self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => "AUTH_HEADER",
            AuthError::Verification(_) => "AUTH_TOKEN",
            AuthError::InvalidClaim(_, _) | AuthError::InvalidJson(_) => "AUTH_CLAIMS",
        };

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_unauthorized() {
        let variants = [
            AuthError::MissingAuthorization,
            AuthError::InvalidAuthorization,
            AuthError::Verification("expired".into()),
            AuthError::InvalidClaim("sub", "junk".into()),
            AuthError::InvalidJson("eof".into()),
        ];
        for err in variants {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
