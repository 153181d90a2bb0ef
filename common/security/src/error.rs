use common_http_errors::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("missing required role")]
    Forbidden,
}

impl From<SecurityError> for ApiError {
    fn from(value: SecurityError) -> Self {
        match value {
            SecurityError::Forbidden => ApiError::Forbidden,
        }
    }
}
