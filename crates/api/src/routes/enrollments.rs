//! Enrollment lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CourseId, EnrollmentId, StudentId};
use serde::Deserialize;
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateEnrollmentRequest {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
}

// -- Handlers --

/// POST /api/enrollments — enroll a student into a course.
pub async fn store<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateEnrollmentRequest>,
) -> Result<ApiResponse, ApiError> {
    let (Some(student_id), Some(course_id)) = (req.student_id, req.course_id) else {
        return Err(ApiError::BadRequest(
            "student_id and course_id are required".to_string(),
        ));
    };

    let enrollment = state
        .enrollments
        .enroll(StudentId::new(student_id), CourseId::new(course_id))
        .await?;

    Ok(ApiResponse::created(
        &enrollment,
        "Enrollment created successfully",
    ))
}

/// PUT /api/enrollments/{id}/complete — mark an enrollment completed.
pub async fn complete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse, ApiError> {
    let enrollment = state
        .enrollments
        .complete_enrollment(EnrollmentId::new(id))
        .await?;

    Ok(ApiResponse::success(
        &enrollment,
        "Enrollment marked as completed",
    ))
}

/// PUT /api/enrollments/{id}/cancel — cancel an enrollment, freeing its seat.
pub async fn cancel<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse, ApiError> {
    let enrollment = state
        .enrollments
        .cancel_enrollment(EnrollmentId::new(id))
        .await?;

    Ok(ApiResponse::success(
        &enrollment,
        "Enrollment cancelled successfully",
    ))
}
