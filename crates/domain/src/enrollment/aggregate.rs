//! Enrollment aggregate implementation.

use chrono::{DateTime, Utc};
use common::{CourseId, EnrollmentId, StudentId};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationErrors};

use super::{EnrollmentError, EnrollmentStatus};

/// Enrollment aggregate root.
///
/// Links exactly one student to exactly one course. The foreign keys are set
/// at creation and never change; only the status and timestamps move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Database-assigned identifier; `None` until first persisted.
    pub id: Option<EnrollmentId>,

    pub student_id: StudentId,
    pub course_id: CourseId,

    pub status: EnrollmentStatus,

    /// When the student enrolled; listing is ordered by this, newest first.
    pub enrolled_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    /// Creates a new active enrollment for a (student, course) pair.
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            student_id,
            course_id,
            status: EnrollmentStatus::Active,
            enrolled_at: now,
            created_at: now,
            updated_at: None,
        }
    }

    /// Validates the foreign keys before the row is ever persisted.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::require_positive(&mut errors, "student_id", self.student_id.as_i64());
        validation::require_positive(&mut errors, "course_id", self.course_id.as_i64());
        errors.into_result()
    }

    /// Returns true while the enrollment counts against capacity and limits.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Transitions the enrollment to completed.
    ///
    /// Fails if the enrollment is not active; completed is terminal.
    pub fn complete(&mut self) -> Result<(), EnrollmentError> {
        if !self.status.is_active() {
            return Err(EnrollmentError::NotActive {
                status: self.status,
                action: "completed",
            });
        }
        self.status = EnrollmentStatus::Completed;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Transitions the enrollment to cancelled.
    ///
    /// Fails if the enrollment is not active; cancelled is terminal.
    pub fn cancel(&mut self) -> Result<(), EnrollmentError> {
        if !self.status.is_active() {
            return Err(EnrollmentError::NotActive {
                status: self.status,
                action: "cancelled",
            });
        }
        self.status = EnrollmentStatus::Cancelled;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}
