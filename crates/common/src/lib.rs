//! Shared identifier types used across the e-learning API crates.

mod types;

pub use types::{CourseId, EnrollmentId, InstructorId, StudentId};
