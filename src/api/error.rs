//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::content::ContentError;
use crate::csr::CsrError;
use crate::intake::IntakeError;
use crate::lifecycle::LifecycleError;
use crate::navigation::Forbidden;
use crate::reporting::ReportingError;
use crate::session::SessionError;
use crate::store::StoreError;
use crate::users::UserError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid username or password")]
    LoginFailed,
    #[error("Login disabled")]
    LoginDisabled,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::LoginFailed => (
                StatusCode::UNAUTHORIZED,
                "LOGIN_FAILED",
                "Username atau password salah".to_string(),
            ),
            ApiError::LoginDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LOGIN_DISABLED",
                "File users.csv tidak ditemukan, login dinonaktifkan".to_string(),
            ),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, "FORBIDDEN", detail.clone()),
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Retry after {retry_after}s"),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::InvalidTransition(detail) => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        // Add retry-after header for rate limited responses
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(val) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<Forbidden> for ApiError {
    fn from(err: Forbidden) -> Self {
        tracing::warn!(role = %err.role, action = ?err.action, "Action denied");
        ApiError::Forbidden(err.to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::LoginDisabled => ApiError::LoginDisabled,
            UserError::InvalidCredentials => ApiError::LoginFailed,
            UserError::Store(e) => e.into(),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::MissingField(_) | LifecycleError::StatusNotAllowed { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            LifecycleError::ReportNotFound(_) => ApiError::NotFound(err.to_string()),
            LifecycleError::NotForwarded { .. } => ApiError::InvalidTransition(err.to_string()),
            LifecycleError::Store(e) => e.into(),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::MissingField(_) => ApiError::BadRequest(err.to_string()),
            IntakeError::Store(e) => e.into(),
        }
    }
}

impl From<CsrError> for ApiError {
    fn from(err: CsrError) -> Self {
        match err {
            CsrError::MissingField(_) => ApiError::BadRequest(err.to_string()),
            CsrError::Store(e) => e.into(),
        }
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        match err {
            ReportingError::InvalidFilter { .. } => ApiError::BadRequest(err.to_string()),
            ReportingError::Xlsx(_) => ApiError::Internal(err.to_string()),
            ReportingError::Store(e) => e.into(),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::BannerTooLarge { .. }
            | ContentError::BannerDimensions { .. }
            | ContentError::UnsupportedImage
            | ContentError::Image(_) => ApiError::BadRequest(err.to_string()),
            ContentError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn rate_limited_returns_429_with_retry_after() {
        let response = ApiError::RateLimited { retry_after: 60 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn login_disabled_returns_503() {
        let response: Response = ApiError::from(UserError::LoginDisabled).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "LOGIN_DISABLED");
    }

    #[tokio::test]
    async fn wrong_credentials_return_login_failed() {
        let response = ApiError::from(UserError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "LOGIN_FAILED");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn lifecycle_errors_map_to_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (LifecycleError::MissingField("village"), StatusCode::BAD_REQUEST),
            (LifecycleError::ReportNotFound(id), StatusCode::NOT_FOUND),
            (
                LifecycleError::NotForwarded {
                    id,
                    status: crate::models::ReportStatus::AwaitingGovernment,
                },
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = Forbidden {
            role: crate::models::Role::Nakes,
            action: crate::navigation::Action::ListUsers,
        };
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
