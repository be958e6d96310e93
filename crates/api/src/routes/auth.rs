//! Authentication endpoints and bearer-token helpers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use domain::{Instructor, Permission, Role, Student, UserAccount};
use serde::Deserialize;
use serde_json::{Value, json};
use service::AuthError;
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// `"student"` (default) or `"instructor"`.
    pub user_type: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

// -- Helpers shared across route modules --

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized - token not provided".to_string()))
}

/// Resolves the bearer token to an account and checks a permission.
pub(crate) async fn authorize<S: Store + Clone>(
    state: &AppState<S>,
    headers: &HeaderMap,
    permission: Permission,
) -> Result<UserAccount, ApiError> {
    let token = bearer_token(headers)?;
    let user = state.auth.current_user(token).await?;

    if !user.has_permission(permission) {
        return Err(ApiError::Forbidden(
            "Forbidden: insufficient permissions".to_string(),
        ));
    }

    Ok(user)
}

/// Serializes an account the way the outward API presents users: entity
/// fields plus the derived `role`.
pub(crate) fn user_payload(user: &UserAccount) -> Value {
    match user {
        UserAccount::Student(student) => student_payload(student),
        UserAccount::Instructor(instructor) => instructor_payload(instructor),
    }
}

pub(crate) fn student_payload(student: &Student) -> Value {
    json!({
        "id": student.id,
        "student_number": student.student_number,
        "email": student.email,
        "name": student.name,
        "phone": student.phone,
        "role": Role::Student,
        "enroll_limit": student.enroll_limit,
        "created_at": student.created_at,
        "updated_at": student.updated_at,
    })
}

fn instructor_payload(instructor: &Instructor) -> Value {
    json!({
        "id": instructor.id,
        "instructor_code": instructor.instructor_code,
        "email": instructor.email,
        "name": instructor.name,
        "phone": instructor.phone,
        "role": Role::Instructor,
        "expertise": instructor.expertise,
        "created_at": instructor.created_at,
        "updated_at": instructor.updated_at,
    })
}

// -- Handlers --

/// POST /api/auth/login — exchange credentials for a token pair.
pub async fn login<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<ApiResponse, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let role: Role = req
        .user_type
        .as_deref()
        .unwrap_or("student")
        .parse()
        .map_err(|_| ApiError::Auth(AuthError::InvalidCredentials))?;

    let tokens = state.auth.login(&req.email, &req.password, role).await?;

    let data = json!({
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "token_type": tokens.token_type,
        "expires_in": tokens.expires_in,
        "user": user_payload(&tokens.user),
    });

    Ok(ApiResponse::success(data, "Login successful"))
}

/// POST /api/auth/refresh — mint a new access token.
pub async fn refresh<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RefreshRequest>,
) -> Result<ApiResponse, ApiError> {
    if req.refresh_token.is_empty() {
        return Err(ApiError::BadRequest("Refresh token is required".to_string()));
    }

    let refreshed = state.auth.refresh(&req.refresh_token).await?;

    let data = json!({
        "access_token": refreshed.access_token,
        "token_type": refreshed.token_type,
        "expires_in": refreshed.expires_in,
    });

    Ok(ApiResponse::success(data, "Token refreshed successfully"))
}

/// GET /api/auth/me — identity carried by the bearer token.
pub async fn me<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    let token = bearer_token(&headers)?;
    let claims = state.auth.verify_token(token)?;

    let data = json!({
        "id": claims.sub,
        "email": claims.email,
        "name": claims.name,
        "role": claims.role,
    });

    Ok(ApiResponse::success(data, "Current user retrieved"))
}

/// POST /api/auth/logout — JWTs are stateless, the client drops its token.
pub async fn logout() -> ApiResponse {
    ApiResponse::success(Value::Null, "Logout successful")
}
