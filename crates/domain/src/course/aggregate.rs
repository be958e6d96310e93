//! Course aggregate implementation.

use chrono::{DateTime, Utc};
use common::CourseId;
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationErrors};

use super::CourseStatus;

/// Course aggregate root.
///
/// Holds the publish state and the enrollment capacity counters. The
/// `current_enrolled` counter is mutated only by the enrollment service as a
/// side effect of enroll/cancel, never directly from client-supplied data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Database-assigned identifier; `None` until first persisted.
    pub id: Option<CourseId>,

    /// Human-facing unique code, e.g. `RUST-101`.
    pub course_code: String,

    pub title: String,
    pub description: String,
    pub category: String,

    /// Publish state; enrollment requires `Published`.
    pub status: CourseStatus,

    /// Seat capacity for this course.
    pub max_students: i32,

    /// Seats consumed by active enrollments.
    pub current_enrolled: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Creates a new draft course with an empty enrollment counter.
    pub fn new(
        course_code: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        max_students: i32,
    ) -> Self {
        Self {
            id: None,
            course_code: course_code.into(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            status: CourseStatus::Draft,
            max_students,
            current_enrolled: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Validates the course fields, returning every problem keyed by field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::require(&mut errors, "course_code", &self.course_code);
        validation::require(&mut errors, "title", &self.title);
        validation::require(&mut errors, "category", &self.category);
        validation::require_positive(&mut errors, "max_students", i64::from(self.max_students));
        errors.into_result()
    }

    /// Returns true if one more student may enroll, given the count of
    /// active enrollments currently held against this course.
    pub fn can_enroll(&self, active_count: i64) -> bool {
        self.status.is_published() && active_count < i64::from(self.max_students)
    }

    /// Consumes one capacity slot.
    ///
    /// The caller must have already verified capacity via [`Course::can_enroll`];
    /// this operation does not re-check.
    pub fn on_enroll(&mut self) {
        self.current_enrolled += 1;
        self.touch();
    }

    /// Frees one capacity slot, flooring the counter at zero.
    pub fn on_cancel_enrollment(&mut self) {
        self.current_enrolled = (self.current_enrolled - 1).max(0);
        self.touch();
    }

    /// Opens the course for enrollment.
    pub fn publish(&mut self) {
        self.status = CourseStatus::Published;
        self.touch();
    }

    /// Takes the course back to draft.
    pub fn unpublish(&mut self) {
        self.status = CourseStatus::Draft;
        self.touch();
    }

    /// Retires the course.
    pub fn archive(&mut self) {
        self.status = CourseStatus::Archived;
        self.touch();
    }

    /// Remaining capacity, never negative.
    pub fn available_seats(&self) -> i32 {
        (self.max_students - self.current_enrolled).max(0)
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
