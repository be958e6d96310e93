//! Route handlers.

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod metrics;
pub mod students;
