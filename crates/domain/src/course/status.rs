//! Course publish state machine.

use serde::{Deserialize, Serialize};

/// The publish state of a course.
///
/// State transitions:
/// ```text
/// Draft ◄──► Published ──► Archived
///               ▲              │
///               └──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    /// Course is being prepared and is not visible for enrollment.
    #[default]
    Draft,

    /// Course is open: students may enroll while capacity remains.
    Published,

    /// Course has been retired; no further enrollment.
    Archived,
}

impl CourseStatus {
    /// Returns true if students may enroll in this state.
    pub fn is_published(&self) -> bool {
        matches!(self, CourseStatus::Published)
    }

    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
            CourseStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "archived" => Ok(CourseStatus::Archived),
            other => Err(format!("unknown course status: {other}")),
        }
    }
}
