//! Integration tests for the API server.
//!
//! Drive the full router over the in-memory store with tower's `oneshot`.

use std::sync::OnceLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::Instructor;
use metrics_exporter_prometheus::PrometheusHandle;
use service::{AuthConfig, auth::hash_password};
use store::{InMemoryStore, InstructorStore};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (Router, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = api::create_state(store.clone(), AuthConfig::new("test-secret"));
    let app = api::create_app(state, get_metrics_handle());
    (app, store)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request_with_token(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Seeds an instructor directly and returns a valid access token.
async fn instructor_token(app: &Router, store: &InMemoryStore) -> String {
    let instructor = Instructor::new(
        "I-2026-0001",
        "teach@elearning.com",
        hash_password("chalkboard").unwrap(),
        "Grace Hopper",
        "+62-812-0000-0002",
        "compilers",
    );
    store.insert_instructor(&instructor).await.unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({
                "email": "teach@elearning.com",
                "password": "chalkboard",
                "user_type": "instructor"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    json["data"]["access_token"].as_str().unwrap().to_string()
}

/// Creates and publishes a course through the API, returning its id.
async fn published_course(app: &Router, token: &str, code: &str, max_students: i32) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request_with_token(
            "POST",
            "/api/courses",
            token,
            serde_json::json!({
                "course_code": code,
                "title": "Intro to Rust",
                "description": "Ownership from scratch",
                "category": "programming",
                "max_students": max_students
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request_with_token(
            "PUT",
            &format!("/api/courses/{id}/publish"),
            token,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    id
}

/// Registers a student through the API, returning its id.
async fn registered_student(app: &Router, email: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/students",
            serde_json::json!({
                "student_number": "S-2026-0001",
                "email": email,
                "password": "password",
                "name": "Ada Lovelace",
                "phone": "+62-812-0000-0001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn enroll(app: &Router, student_id: i64, course_id: i64) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/enrollments",
            serde_json::json!({ "student_id": student_id, "course_id": course_id }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_student_registration_envelope() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/students",
            serde_json::json!({
                "student_number": "S-2026-0001",
                "email": "student1@elearning.com",
                "password": "password",
                "name": "Ada Lovelace",
                "phone": "+62-812-0000-0001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["status_code"], 201);
    assert_eq!(json["message"], "Student created successfully");
    assert_eq!(json["data"]["role"], "student");
    assert_eq!(json["data"]["enroll_limit"], 5);
    assert!(json["data"].get("password").is_none());
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_student_validation_errors_are_field_keyed() {
    let (app, _) = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/students",
            serde_json::json!({
                "student_number": "S-2026-0001",
                "email": "not-an-email",
                "password": "password",
                "name": "",
                "phone": "+62-812"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["errors"]["email"][0].is_string());
    assert!(json["errors"]["name"][0].is_string());
}

#[tokio::test]
async fn test_course_creation_requires_instructor() {
    let (app, store) = setup();

    // No token at all.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/courses",
            serde_json::json!({
                "course_code": "RUST-101",
                "title": "Intro",
                "category": "programming",
                "max_students": 10
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A student token is not enough.
    registered_student(&app, "student1@elearning.com").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "email": "student1@elearning.com", "password": "password" }),
        ))
        .await
        .unwrap();
    let student_token = response_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(json_request_with_token(
            "POST",
            "/api/courses",
            &student_token,
            serde_json::json!({
                "course_code": "RUST-101",
                "title": "Intro",
                "category": "programming",
                "max_students": 10
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = response_json(response).await;
    assert_eq!(json["message"], "Forbidden: insufficient permissions");

    // An instructor token works.
    let token = instructor_token(&app, &store).await;
    published_course(&app, &token, "RUST-101B", 10).await;
}

#[tokio::test]
async fn test_course_listing_filters_by_status() {
    let (app, store) = setup();
    let token = instructor_token(&app, &store).await;
    published_course(&app, &token, "RUST-101", 10).await;

    // A second course that stays draft.
    let response = app
        .clone()
        .oneshot(json_request_with_token(
            "POST",
            "/api/courses",
            &token,
            serde_json::json!({
                "course_code": "GO-101",
                "title": "Intro to Go",
                "category": "programming",
                "max_students": 10
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_request("/api/courses?status=published"))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["status"], "published");

    let response = app
        .oneshot(get_request("/api/courses"))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["meta"]["total"], 2);
}

#[tokio::test]
async fn test_enrollment_lifecycle_over_http() {
    let (app, store) = setup();
    let token = instructor_token(&app, &store).await;
    let course_id = published_course(&app, &token, "RUST-101", 1).await;
    let first = registered_student(&app, "a@elearning.com").await;
    let second = registered_student(&app, "b@elearning.com").await;

    // First student takes the only seat.
    let response = enroll(&app, first, course_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_json(response).await;
    assert_eq!(json["data"]["status"], "active");
    let enrollment_id = json["data"]["id"].as_i64().unwrap();

    // Second student bounces off the full course.
    let response = enroll(&app, second, course_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["message"], "Course is full or not published");

    // Duplicate enrollment is rejected.
    let response = enroll(&app, first, course_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["message"], "Student already enrolled in this course");

    // Cancelling frees the seat.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/enrollments/{enrollment_id}/cancel"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["data"]["status"], "cancelled");

    // Retry for the second student now succeeds.
    let response = enroll(&app, second, course_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Cancelling the same enrollment again is a business error.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/enrollments/{enrollment_id}/cancel"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["message"], "Only active enrollments can be cancelled");
}

#[tokio::test]
async fn test_enrollment_requires_both_ids() {
    let (app, _) = setup();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/enrollments",
            serde_json::json!({ "student_id": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["message"], "student_id and course_id are required");
}

#[tokio::test]
async fn test_enrollment_for_missing_course_is_not_found() {
    let (app, _) = setup();
    let student_id = registered_student(&app, "a@elearning.com").await;

    let response = enroll(&app, student_id, 42).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = response_json(response).await;
    assert_eq!(json["message"], "Course with ID 42 not found");
}

#[tokio::test]
async fn test_student_enrollments_listing_with_meta() {
    let (app, store) = setup();
    let token = instructor_token(&app, &store).await;
    let first_course = published_course(&app, &token, "RUST-101", 10).await;
    let second_course = published_course(&app, &token, "GO-101", 10).await;
    let student_id = registered_student(&app, "a@elearning.com").await;

    assert_eq!(
        enroll(&app, student_id, first_course).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        enroll(&app, student_id, second_course).await.status(),
        StatusCode::CREATED
    );

    let response = app
        .oneshot(get_request(&format!(
            "/api/students/{student_id}/enrollments"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["meta"]["total_enrollments"], 2);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _) = setup();
    registered_student(&app, "a@elearning.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "email": "a@elearning.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = response_json(response).await;
    assert_eq!(json["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_auth_me_roundtrip() {
    let (app, _) = setup();
    registered_student(&app, "a@elearning.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "email": "a@elearning.com", "password": "password" }),
        ))
        .await
        .unwrap();
    let token = response_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["data"]["email"], "a@elearning.com");
    assert_eq!(json["data"]["role"], "student");

    // Without a token the endpoint rejects.
    let response = app.oneshot(get_request("/api/auth/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let (app, _) = setup();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
