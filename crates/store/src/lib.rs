//! Persistence layer for the e-learning API.
//!
//! Defines the repository traits the service layer consumes, together with
//! two implementations:
//! - [`PostgresStore`]: the production store backed by a `sqlx` connection
//!   pool, injected at construction time (no process-wide singleton).
//! - [`InMemoryStore`]: a lock-based store for tests with the same
//!   transactional semantics.
//!
//! Multi-entity writes (enroll, cancel) go through the [`EnrollmentTxn`]
//! unit of work: every read and write between `begin_enrollment` and
//! `commit` is atomic with respect to other units of work.

mod error;
mod memory;
mod postgres;
mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{
    CourseFilter, CourseStore, EnrollmentStore, EnrollmentTxn, InstructorStore, Store,
    StudentStore,
};
