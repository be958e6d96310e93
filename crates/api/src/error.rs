//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::{AuthError, ServiceError};

use crate::response::ApiResponse;

/// API-level error type that maps to enveloped HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request from the client.
    BadRequest(String),
    /// Missing or invalid credentials.
    Unauthorized(String),
    /// Authenticated, but not allowed.
    Forbidden(String),
    /// Business/service layer error.
    Service(ServiceError),
    /// Authentication layer error.
    Auth(AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                ApiResponse::error(StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Unauthorized(msg) => {
                ApiResponse::error(StatusCode::UNAUTHORIZED, msg).into_response()
            }
            ApiError::Forbidden(msg) => {
                ApiResponse::error(StatusCode::FORBIDDEN, msg).into_response()
            }
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Auth(err) => auth_error_to_response(err),
        }
    }
}

fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::NotFound { .. } => {
            ApiResponse::error(StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        ServiceError::Business(_) => {
            ApiResponse::error(StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        ServiceError::Validation(errors) => ApiResponse::validation_error(&errors).into_response(),
        ServiceError::Store(_) | ServiceError::Hash(_) => {
            tracing::error!(error = %err, "internal server error");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials
        | AuthError::InvalidToken
        | AuthError::InvalidRefreshToken
        | AuthError::UserNotFound => {
            ApiResponse::error(StatusCode::UNAUTHORIZED, err.to_string()).into_response()
        }
        AuthError::TokenEncoding(_) | AuthError::Hash(_) | AuthError::Store(_) => {
            tracing::error!(error = %err, "internal server error");
            ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}
