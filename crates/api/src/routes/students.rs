//! Student endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::StudentId;
use serde::Deserialize;
use serde_json::Value;
use service::NewStudent;
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::auth::student_payload;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateStudentRequest {
    pub student_number: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub enroll_limit: Option<i32>,
}

// -- Handlers --

/// GET /api/students — list all students.
pub async fn index<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<ApiResponse, ApiError> {
    let students = state.students.get_students().await?;
    let data: Vec<Value> = students.iter().map(student_payload).collect();

    Ok(ApiResponse::success(data, "Students retrieved").with_meta("total", students.len()))
}

/// GET /api/students/{id} — load a single student.
pub async fn show<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse, ApiError> {
    let student = state.students.get_student(StudentId::new(id)).await?;
    Ok(ApiResponse::success(student_payload(&student), "Student retrieved"))
}

/// POST /api/students — register a new student.
pub async fn store<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<ApiResponse, ApiError> {
    let student = state
        .students
        .create_student(NewStudent {
            student_number: req.student_number,
            email: req.email,
            password: req.password,
            name: req.name,
            phone: req.phone,
            enroll_limit: req.enroll_limit,
        })
        .await?;

    Ok(ApiResponse::created(
        student_payload(&student),
        "Student created successfully",
    ))
}

/// GET /api/students/{id}/enrollments — the student's enrollments,
/// newest first.
pub async fn enrollments<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse, ApiError> {
    let enrollments = state
        .enrollments
        .enrollments_by_student(StudentId::new(id))
        .await?;

    Ok(
        ApiResponse::success(&enrollments, "Student enrollments retrieved")
            .with_meta("total_enrollments", enrollments.len()),
    )
}
