use async_trait::async_trait;
use common::{CourseId, EnrollmentId, InstructorId, StudentId};
use domain::{Course, CourseStatus, Enrollment, Instructor, Student};

use crate::Result;

/// Optional filters for course listing.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub category: Option<String>,
}

/// Course lookups and writes.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Looks up a course by identifier.
    async fn find_course(&self, id: CourseId) -> Result<Option<Course>>;

    /// Looks up a course by its unique human-facing code.
    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>>;

    /// Lists courses matching the filter, newest first.
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>>;

    /// Searches title, description, and category for a term, ordered by title.
    async fn search_courses(&self, term: &str) -> Result<Vec<Course>>;

    /// Inserts a new course, returning it with its assigned identifier.
    async fn insert_course(&self, course: &Course) -> Result<Course>;

    /// Persists changes to an existing course.
    async fn update_course(&self, course: &Course) -> Result<()>;

    /// Deletes a course; returns false if it did not exist.
    async fn delete_course(&self, id: CourseId) -> Result<bool>;
}

/// Student lookups and writes.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>>;

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>>;

    /// Lists all students, newest first.
    async fn list_students(&self) -> Result<Vec<Student>>;

    /// Inserts a new student, returning it with its assigned identifier.
    async fn insert_student(&self, student: &Student) -> Result<Student>;

    /// Persists changes to an existing student.
    async fn update_student(&self, student: &Student) -> Result<()>;

    /// Deletes a student; returns false if it did not exist.
    async fn delete_student(&self, id: StudentId) -> Result<bool>;
}

/// Instructor lookups and writes.
#[async_trait]
pub trait InstructorStore: Send + Sync {
    async fn find_instructor(&self, id: InstructorId) -> Result<Option<Instructor>>;

    async fn find_instructor_by_email(&self, email: &str) -> Result<Option<Instructor>>;

    /// Inserts a new instructor, returning it with its assigned identifier.
    async fn insert_instructor(&self, instructor: &Instructor) -> Result<Instructor>;
}

/// Enrollment lookups, single-row writes, and the unit-of-work entry point.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>>;

    /// Returns the enrollment row for a (course, student) pair regardless of
    /// its status, if one exists.
    async fn find_by_course_and_student(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Option<Enrollment>>;

    /// Returns all enrollments of a student, most recently enrolled first.
    async fn enrollments_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>>;

    /// Counts enrollments in `active` status held against a course.
    async fn count_active_by_course(&self, course_id: CourseId) -> Result<i64>;

    /// Counts enrollments in `active` status held by a student.
    async fn count_active_by_student(&self, student_id: StudentId) -> Result<i64>;

    /// Persists changes to an existing enrollment outside a unit of work.
    async fn update_enrollment(&self, enrollment: &Enrollment) -> Result<()>;

    /// Begins a unit of work covering enrollment writes and the course
    /// capacity counter.
    async fn begin_enrollment(&self) -> Result<Box<dyn EnrollmentTxn>>;
}

/// Convenience bound for a handle implementing every repository trait.
pub trait Store: CourseStore + StudentStore + InstructorStore + EnrollmentStore {}

impl<T> Store for T where T: CourseStore + StudentStore + InstructorStore + EnrollmentStore {}

/// Unit of work for the enroll and cancel transitions.
///
/// All reads and writes made through one handle are atomic with respect to
/// other units of work: either `commit` makes every write visible at once,
/// or dropping the handle (or calling `rollback`) discards them all.
///
/// `find_course_for_update` additionally takes an exclusive claim on the
/// course row, so two concurrent units of work cannot both observe the last
/// free seat.
#[async_trait]
pub trait EnrollmentTxn: Send {
    /// Loads a course and locks it against concurrent units of work.
    async fn find_course_for_update(&mut self, id: CourseId) -> Result<Option<Course>>;

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>>;

    /// Loads an enrollment, claiming it for this unit of work.
    async fn find_enrollment(&mut self, id: EnrollmentId) -> Result<Option<Enrollment>>;

    async fn find_by_course_and_student(
        &mut self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Option<Enrollment>>;

    async fn count_active_by_course(&mut self, course_id: CourseId) -> Result<i64>;

    async fn count_active_by_student(&mut self, student_id: StudentId) -> Result<i64>;

    /// Inserts a new enrollment row, returning it with its assigned
    /// identifier. The row becomes visible to others only at commit.
    async fn insert_enrollment(&mut self, enrollment: &Enrollment) -> Result<Enrollment>;

    /// Stages changes to an existing enrollment.
    async fn update_enrollment(&mut self, enrollment: &Enrollment) -> Result<()>;

    /// Stages changes to an existing course (the capacity counter).
    async fn update_course(&mut self, course: &Course) -> Result<()>;

    /// Makes every staged write visible atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards every staged write. Dropping the handle has the same effect.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
