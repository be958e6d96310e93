//! Enrollment aggregate and related types.

mod aggregate;
mod status;

pub use aggregate::Enrollment;
pub use status::EnrollmentStatus;

use common::{CourseId, StudentId};
use thiserror::Error;

/// Business-rule violations raised by the enrollment lifecycle.
///
/// Every variant carries a caller-facing message and maps to a 400-class
/// response at the HTTP boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnrollmentError {
    /// An enrollment row already exists for this (student, course) pair.
    #[error("Student already enrolled in this course")]
    AlreadyEnrolled {
        student_id: StudentId,
        course_id: CourseId,
    },

    /// The course is not published or has no free capacity.
    #[error("Course is full or not published")]
    CourseUnavailable { course_id: CourseId },

    /// The student already holds `enroll_limit` active enrollments.
    #[error("Student has reached enroll limit")]
    EnrollLimitReached { student_id: StudentId, limit: i32 },

    /// A transition was requested on an enrollment that is no longer active.
    #[error("Only active enrollments can be {action}")]
    NotActive {
        status: EnrollmentStatus,
        action: &'static str,
    },
}
