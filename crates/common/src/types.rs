use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// Wraps the database-assigned numeric key to provide type safety and
        /// prevent mixing up identifiers of different entities.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database key.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }

            /// Returns true if the identifier is a valid database key (> 0).
            pub fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a course.
    CourseId
}

entity_id! {
    /// Unique identifier for a student.
    StudentId
}

entity_id! {
    /// Unique identifier for an instructor.
    InstructorId
}

entity_id! {
    /// Unique identifier for an enrollment.
    EnrollmentId
}
