//! HTTP API server with observability for the e-learning platform.
//!
//! Provides REST endpoints for courses, students, enrollments, and
//! authentication, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use service::{AuthConfig, AuthService, CourseService, EnrollmentService, StudentService};
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub courses: CourseService<S>,
    pub students: StudentService<S>,
    pub enrollments: EnrollmentService<S>,
    pub auth: AuthService<S>,
}

/// Builds the application state, handing each service a clone of the store.
pub fn create_state<S: Store + Clone>(store: S, auth_config: AuthConfig) -> Arc<AppState<S>> {
    Arc::new(AppState {
        courses: CourseService::new(store.clone()),
        students: StudentService::new(store.clone()),
        enrollments: EnrollmentService::new(store.clone()),
        auth: AuthService::new(store, auth_config),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/auth/login", post(routes::auth::login::<S>))
        .route("/auth/refresh", post(routes::auth::refresh::<S>))
        .route("/auth/me", get(routes::auth::me::<S>))
        .route("/auth/logout", post(routes::auth::logout))
        .route(
            "/courses",
            get(routes::courses::index::<S>).post(routes::courses::store::<S>),
        )
        .route("/courses/search", get(routes::courses::search::<S>))
        .route(
            "/courses/{id}",
            get(routes::courses::show::<S>)
                .put(routes::courses::update::<S>)
                .delete(routes::courses::destroy::<S>),
        )
        .route("/courses/{id}/publish", put(routes::courses::publish::<S>))
        .route(
            "/students",
            get(routes::students::index::<S>).post(routes::students::store::<S>),
        )
        .route("/students/{id}", get(routes::students::show::<S>))
        .route(
            "/students/{id}/enrollments",
            get(routes::students::enrollments::<S>),
        )
        .route("/enrollments", post(routes::enrollments::store::<S>))
        .route(
            "/enrollments/{id}/complete",
            put(routes::enrollments::complete::<S>),
        )
        .route(
            "/enrollments/{id}/cancel",
            put(routes::enrollments::cancel::<S>),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
