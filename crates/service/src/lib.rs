//! Business services for the e-learning API.
//!
//! Each service is generic over the store traits it consumes and receives
//! its store handle at construction time (constructor injection; no global
//! state). [`EnrollmentService`] is the heart of the system: it coordinates
//! the Course and Enrollment aggregates inside a single unit of work so the
//! capacity invariants hold even under concurrent requests.

pub mod auth;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod student;

pub use auth::{AuthConfig, AuthError, AuthService, Claims, IssuedTokens, RefreshedToken};
pub use course::{CourseService, NewCourse, UpdateCourse};
pub use enrollment::EnrollmentService;
pub use error::ServiceError;
pub use student::{NewStudent, StudentService, UpdateStudent};
