//! Student and instructor accounts.
//!
//! The two account kinds are unified by the [`UserAccount`] sum type rather
//! than an inheritance chain: shared capabilities (role, permission check,
//! credential fields) are answered by explicit variant matching.

use chrono::{DateTime, Utc};
use common::{InstructorId, StudentId};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationErrors};

/// The role a user account carries in issued tokens and permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    /// Returns the role name as carried in JWT claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewCourse,
    EnrollCourse,
    ViewOwnEnrollments,
    CreateCourse,
    UpdateCourse,
    PublishCourse,
    ViewOwnCourses,
}

/// A student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Database-assigned identifier; `None` until first persisted.
    pub id: Option<StudentId>,

    /// Registry number, e.g. `S-2026-0042`.
    pub student_number: String,

    pub email: String,

    /// Bcrypt hash; never the plaintext password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,
    pub phone: String,

    /// Maximum simultaneous active enrollments for this student.
    pub enroll_limit: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Default cap on simultaneous active enrollments.
pub const DEFAULT_ENROLL_LIMIT: i32 = 5;

impl Student {
    /// Creates a new student with the default enroll limit.
    pub fn new(
        student_number: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            student_number: student_number.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            phone: phone.into(),
            enroll_limit: DEFAULT_ENROLL_LIMIT,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Validates the account fields, returning every problem keyed by field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::require(&mut errors, "student_number", &self.student_number);
        validation::require(&mut errors, "email", &self.email);
        validation::require_email(&mut errors, "email", &self.email);
        validation::require(&mut errors, "name", &self.name);
        validation::require(&mut errors, "phone", &self.phone);
        validation::require_positive(&mut errors, "enroll_limit", i64::from(self.enroll_limit));
        errors.into_result()
    }

    /// Returns true if the student may hold one more active enrollment,
    /// given their current count of active enrollments.
    pub fn can_enroll_more(&self, active_count: i64) -> bool {
        active_count < i64::from(self.enroll_limit)
    }
}

/// An instructor account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    /// Database-assigned identifier; `None` until first persisted.
    pub id: Option<InstructorId>,

    /// Registry code, e.g. `I-2026-0007`.
    pub instructor_code: String,

    pub email: String,

    /// Bcrypt hash; never the plaintext password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,
    pub phone: String,
    pub expertise: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Instructor {
    /// Creates a new instructor account.
    pub fn new(
        instructor_code: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        expertise: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            instructor_code: instructor_code.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            phone: phone.into(),
            expertise: expertise.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Validates the account fields, returning every problem keyed by field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::require(&mut errors, "instructor_code", &self.instructor_code);
        validation::require(&mut errors, "email", &self.email);
        validation::require_email(&mut errors, "email", &self.email);
        validation::require(&mut errors, "name", &self.name);
        validation::require(&mut errors, "phone", &self.phone);
        errors.into_result()
    }
}

/// A user account of either kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserAccount {
    Student(Student),
    Instructor(Instructor),
}

impl UserAccount {
    /// Returns the role of this account.
    pub fn role(&self) -> Role {
        match self {
            UserAccount::Student(_) => Role::Student,
            UserAccount::Instructor(_) => Role::Instructor,
        }
    }

    /// Returns the raw numeric identifier, if persisted.
    pub fn id(&self) -> Option<i64> {
        match self {
            UserAccount::Student(s) => s.id.map(i64::from),
            UserAccount::Instructor(i) => i.id.map(i64::from),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            UserAccount::Student(s) => &s.email,
            UserAccount::Instructor(i) => &i.email,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            UserAccount::Student(s) => &s.name,
            UserAccount::Instructor(i) => &i.name,
        }
    }

    /// Returns the stored bcrypt hash for credential verification.
    pub fn password_hash(&self) -> &str {
        match self {
            UserAccount::Student(s) => &s.password_hash,
            UserAccount::Instructor(i) => &i.password_hash,
        }
    }

    /// Returns true if this account is allowed the given action.
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserAccount::Student(_) => matches!(
                permission,
                Permission::ViewCourse | Permission::EnrollCourse | Permission::ViewOwnEnrollments
            ),
            UserAccount::Instructor(_) => matches!(
                permission,
                Permission::CreateCourse
                    | Permission::UpdateCourse
                    | Permission::PublishCourse
                    | Permission::ViewOwnCourses
            ),
        }
    }
}
