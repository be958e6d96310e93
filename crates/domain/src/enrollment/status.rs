//! Enrollment lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The state of an enrollment in its lifecycle.
///
/// State transitions:
/// ```text
/// Active ──┬──► Completed
///          └──► Cancelled
/// ```
///
/// Both `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// Enrollment counts against course capacity and the student's limit.
    #[default]
    Active,

    /// Student finished the course; the seat stays historically consumed.
    Completed,

    /// Enrollment was cancelled; its seat has been freed.
    Cancelled,
}

impl EnrollmentStatus {
    /// Returns true if the enrollment may still transition.
    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Active)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrollmentStatus::Completed | EnrollmentStatus::Cancelled)
    }

    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "cancelled" => Ok(EnrollmentStatus::Cancelled),
            other => Err(format!("unknown enrollment status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_active() {
        assert_eq!(EnrollmentStatus::default(), EnrollmentStatus::Active);
    }

    #[test]
    fn only_active_may_transition() {
        assert!(EnrollmentStatus::Active.is_active());
        assert!(!EnrollmentStatus::Completed.is_active());
        assert!(!EnrollmentStatus::Cancelled.is_active());
    }

    #[test]
    fn completed_and_cancelled_are_terminal() {
        assert!(!EnrollmentStatus::Active.is_terminal());
        assert!(EnrollmentStatus::Completed.is_terminal());
        assert!(EnrollmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn parse_roundtrip() {
        for status in [
            EnrollmentStatus::Active,
            EnrollmentStatus::Completed,
            EnrollmentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<EnrollmentStatus>(), Ok(status));
        }
        assert!("paused".parse::<EnrollmentStatus>().is_err());
    }
}
