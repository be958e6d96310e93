//! Course CRUD and publication endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use common::CourseId;
use domain::Permission;
use serde::Deserialize;
use serde_json::Value;
use service::{NewCourse, UpdateCourse};
use store::{CourseFilter, Store};

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::auth::authorize;

// -- Request types --

#[derive(Deserialize)]
pub struct ListCoursesQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub max_students: i32,
}

#[derive(Deserialize, Default)]
pub struct UpdateCourseRequest {
    pub course_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub max_students: Option<i32>,
}

fn filter_from_query(query: ListCoursesQuery) -> Result<CourseFilter, ApiError> {
    let status = query
        .status
        .map(|status| {
            status
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid status: {status}")))
        })
        .transpose()?;

    Ok(CourseFilter {
        status,
        category: query.category,
    })
}

// -- Handlers --

/// GET /api/courses — list courses with optional status/category filters.
pub async fn index<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<ApiResponse, ApiError> {
    let filter = filter_from_query(query)?;
    let courses = state.courses.get_courses(&filter).await?;

    Ok(ApiResponse::success(&courses, "Courses retrieved").with_meta("total", courses.len()))
}

/// GET /api/courses/search?q=term — search title, description, category.
pub async fn search<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    let courses = state.courses.search_courses(query.q.trim()).await?;
    Ok(ApiResponse::success(&courses, "Courses retrieved").with_meta("total", courses.len()))
}

/// GET /api/courses/{id} — load a single course.
pub async fn show<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse, ApiError> {
    let course = state.courses.get_course(CourseId::new(id)).await?;
    Ok(ApiResponse::success(&course, "Course retrieved"))
}

/// POST /api/courses — create a new draft course (instructors only).
pub async fn store<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<CreateCourseRequest>,
) -> Result<ApiResponse, ApiError> {
    authorize(&state, &headers, Permission::CreateCourse).await?;

    let course = state
        .courses
        .create_course(NewCourse {
            course_code: req.course_code,
            title: req.title,
            description: req.description,
            category: req.category,
            max_students: req.max_students,
        })
        .await?;

    Ok(ApiResponse::created(&course, "Course created successfully"))
}

/// PUT /api/courses/{id} — merge fields into an existing course
/// (instructors only).
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<ApiResponse, ApiError> {
    authorize(&state, &headers, Permission::UpdateCourse).await?;

    let course = state
        .courses
        .update_course(
            CourseId::new(id),
            UpdateCourse {
                course_code: req.course_code,
                title: req.title,
                description: req.description,
                category: req.category,
                max_students: req.max_students,
            },
        )
        .await?;

    Ok(ApiResponse::success(&course, "Course updated successfully"))
}

/// DELETE /api/courses/{id} — remove a course (instructors only).
pub async fn destroy<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    authorize(&state, &headers, Permission::UpdateCourse).await?;

    state.courses.delete_course(CourseId::new(id)).await?;
    Ok(ApiResponse::success(Value::Null, "Course deleted successfully"))
}

/// PUT /api/courses/{id}/publish — open a course for enrollment
/// (instructors only).
pub async fn publish<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    authorize(&state, &headers, Permission::PublishCourse).await?;

    let course = state.courses.publish_course(CourseId::new(id)).await?;
    Ok(ApiResponse::success(&course, "Course published successfully"))
}
