use core::fmt;

use actix_web::{http::StatusCode, HttpResponse};

use crate::response::json_error;
use crate::store::{ConflictKind, StoreError};

/// Request-level error taxonomy. Every handler failure is one of these, and
/// each maps to exactly one HTTP status and a structured `{error}` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    InvalidInput(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// Storage was busy past its bounded timeout; the caller may retry.
    Busy,
    /// Unexpected fault. The detail is logged, never sent to the client.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Busy => write!(f, "Storage is busy, please retry"),
            Self::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Busy => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!("request failed: {detail}");
                "Internal server error".to_string()
            }
            Self::Busy => {
                tracing::warn!("storage busy past timeout");
                "Storage is busy, please retry".to_string()
            }
            other => other.to_string(),
        };
        json_error(status, message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(ConflictKind::WalletTaken) => {
                Self::Conflict("Wallet already has an account".to_string())
            }
            StoreError::Conflict(ConflictKind::UsernameTaken) => {
                Self::Conflict("Username already taken".to_string())
            }
            StoreError::Busy => Self::Busy,
            StoreError::Internal(detail) => Self::Internal(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Busy.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_conflicts_map_to_client_messages() {
        assert_eq!(
            ApiError::from(StoreError::Conflict(ConflictKind::WalletTaken)),
            ApiError::Conflict("Wallet already has an account".to_string())
        );
        assert_eq!(
            ApiError::from(StoreError::Conflict(ConflictKind::UsernameTaken)),
            ApiError::Conflict("Username already taken".to_string())
        );
    }
}
