use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CourseId, EnrollmentId, InstructorId, StudentId};
use domain::{Course, Enrollment, Instructor, Student};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::store::{
    CourseFilter, CourseStore, EnrollmentStore, EnrollmentTxn, InstructorStore, StudentStore,
};
use crate::{Result, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    courses: HashMap<i64, Course>,
    students: HashMap<i64, Student>,
    instructors: HashMap<i64, Instructor>,
    enrollments: HashMap<i64, Enrollment>,
    next_course_id: i64,
    next_student_id: i64,
    next_instructor_id: i64,
    next_enrollment_id: i64,
}

impl MemoryState {
    fn count_active_by_course(&self, course_id: CourseId) -> i64 {
        self.enrollments
            .values()
            .filter(|e| e.course_id == course_id && e.is_active())
            .count() as i64
    }

    fn count_active_by_student(&self, student_id: StudentId) -> i64 {
        self.enrollments
            .values()
            .filter(|e| e.student_id == student_id && e.is_active())
            .count() as i64
    }

    fn find_by_course_and_student(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Option<Enrollment> {
        self.enrollments
            .values()
            .find(|e| e.course_id == course_id && e.student_id == student_id)
            .cloned()
    }
}

/// In-memory store implementation for testing.
///
/// Provides the same interface and transactional semantics as the
/// PostgreSQL implementation: a unit of work holds the state write lock
/// exclusively and buffers its writes until commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn find_course(&self, id: CourseId) -> Result<Option<Course>> {
        Ok(self.state.read().await.courses.get(&id.as_i64()).cloned())
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        Ok(self
            .state
            .read()
            .await
            .courses
            .values()
            .find(|c| c.course_code == code)
            .cloned())
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        let state = self.state.read().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| filter.status.is_none_or(|status| c.status == status))
            .filter(|c| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| &c.category == category)
            })
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn search_courses(&self, term: &str) -> Result<Vec<Course>> {
        let needle = term.to_lowercase();
        let state = self.state.read().await;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|c| {
                c.title.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
                    || c.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn insert_course(&self, course: &Course) -> Result<Course> {
        let mut state = self.state.write().await;
        state.next_course_id += 1;
        let id = state.next_course_id;
        let inserted = Course {
            id: Some(CourseId::new(id)),
            ..course.clone()
        };
        state.courses.insert(id, inserted.clone());
        Ok(inserted)
    }

    async fn update_course(&self, course: &Course) -> Result<()> {
        let id = course.id.ok_or(StoreError::MissingId("course"))?;
        let mut state = self.state.write().await;
        state.courses.insert(id.as_i64(), course.clone());
        Ok(())
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool> {
        Ok(self
            .state
            .write()
            .await
            .courses
            .remove(&id.as_i64())
            .is_some())
    }
}

#[async_trait]
impl StudentStore for InMemoryStore {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.state.read().await.students.get(&id.as_i64()).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        Ok(self
            .state
            .read()
            .await
            .students
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn list_students(&self) -> Result<Vec<Student>> {
        let state = self.state.read().await;
        let mut students: Vec<Student> = state.students.values().cloned().collect();
        students.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(students)
    }

    async fn insert_student(&self, student: &Student) -> Result<Student> {
        let mut state = self.state.write().await;
        state.next_student_id += 1;
        let id = state.next_student_id;
        let inserted = Student {
            id: Some(StudentId::new(id)),
            ..student.clone()
        };
        state.students.insert(id, inserted.clone());
        Ok(inserted)
    }

    async fn update_student(&self, student: &Student) -> Result<()> {
        let id = student.id.ok_or(StoreError::MissingId("student"))?;
        let mut state = self.state.write().await;
        state.students.insert(id.as_i64(), student.clone());
        Ok(())
    }

    async fn delete_student(&self, id: StudentId) -> Result<bool> {
        Ok(self
            .state
            .write()
            .await
            .students
            .remove(&id.as_i64())
            .is_some())
    }
}

#[async_trait]
impl InstructorStore for InMemoryStore {
    async fn find_instructor(&self, id: InstructorId) -> Result<Option<Instructor>> {
        Ok(self
            .state
            .read()
            .await
            .instructors
            .get(&id.as_i64())
            .cloned())
    }

    async fn find_instructor_by_email(&self, email: &str) -> Result<Option<Instructor>> {
        Ok(self
            .state
            .read()
            .await
            .instructors
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn insert_instructor(&self, instructor: &Instructor) -> Result<Instructor> {
        let mut state = self.state.write().await;
        state.next_instructor_id += 1;
        let id = state.next_instructor_id;
        let inserted = Instructor {
            id: Some(InstructorId::new(id)),
            ..instructor.clone()
        };
        state.instructors.insert(id, inserted.clone());
        Ok(inserted)
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryStore {
    async fn find_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .get(&id.as_i64())
            .cloned())
    }

    async fn find_by_course_and_student(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Option<Enrollment>> {
        Ok(self
            .state
            .read()
            .await
            .find_by_course_and_student(course_id, student_id))
    }

    async fn enrollments_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>> {
        let state = self.state.read().await;
        let mut enrollments: Vec<Enrollment> = state
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        Ok(enrollments)
    }

    async fn count_active_by_course(&self, course_id: CourseId) -> Result<i64> {
        Ok(self.state.read().await.count_active_by_course(course_id))
    }

    async fn count_active_by_student(&self, student_id: StudentId) -> Result<i64> {
        Ok(self.state.read().await.count_active_by_student(student_id))
    }

    async fn update_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
        let id = enrollment.id.ok_or(StoreError::MissingId("enrollment"))?;
        let mut state = self.state.write().await;
        state.enrollments.insert(id.as_i64(), enrollment.clone());
        Ok(())
    }

    async fn begin_enrollment(&self) -> Result<Box<dyn EnrollmentTxn>> {
        let guard = self.state.clone().write_owned().await;
        Ok(Box::new(MemoryEnrollmentTxn {
            guard,
            staged: Vec::new(),
        }))
    }
}

enum StagedWrite {
    InsertEnrollment(Enrollment),
    UpdateEnrollment(Enrollment),
    UpdateCourse(Course),
}

/// Unit of work holding the state lock exclusively.
///
/// Writes are buffered and applied only at commit, so dropping the handle
/// without committing leaves the store untouched (identifier sequences
/// excepted, matching database sequence behavior).
struct MemoryEnrollmentTxn {
    guard: OwnedRwLockWriteGuard<MemoryState>,
    staged: Vec<StagedWrite>,
}

#[async_trait]
impl EnrollmentTxn for MemoryEnrollmentTxn {
    async fn find_course_for_update(&mut self, id: CourseId) -> Result<Option<Course>> {
        // The write guard is already exclusive; no extra row lock needed.
        Ok(self.guard.courses.get(&id.as_i64()).cloned())
    }

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.guard.students.get(&id.as_i64()).cloned())
    }

    async fn find_enrollment(&mut self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        Ok(self.guard.enrollments.get(&id.as_i64()).cloned())
    }

    async fn find_by_course_and_student(
        &mut self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Option<Enrollment>> {
        Ok(self.guard.find_by_course_and_student(course_id, student_id))
    }

    async fn count_active_by_course(&mut self, course_id: CourseId) -> Result<i64> {
        Ok(self.guard.count_active_by_course(course_id))
    }

    async fn count_active_by_student(&mut self, student_id: StudentId) -> Result<i64> {
        Ok(self.guard.count_active_by_student(student_id))
    }

    async fn insert_enrollment(&mut self, enrollment: &Enrollment) -> Result<Enrollment> {
        self.guard.next_enrollment_id += 1;
        let inserted = Enrollment {
            id: Some(EnrollmentId::new(self.guard.next_enrollment_id)),
            ..enrollment.clone()
        };
        self.staged.push(StagedWrite::InsertEnrollment(inserted.clone()));
        Ok(inserted)
    }

    async fn update_enrollment(&mut self, enrollment: &Enrollment) -> Result<()> {
        enrollment.id.ok_or(StoreError::MissingId("enrollment"))?;
        self.staged
            .push(StagedWrite::UpdateEnrollment(enrollment.clone()));
        Ok(())
    }

    async fn update_course(&mut self, course: &Course) -> Result<()> {
        course.id.ok_or(StoreError::MissingId("course"))?;
        self.staged.push(StagedWrite::UpdateCourse(course.clone()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Self { mut guard, staged } = *self;
        for write in staged {
            match write {
                StagedWrite::InsertEnrollment(enrollment)
                | StagedWrite::UpdateEnrollment(enrollment) => {
                    let id = enrollment.id.ok_or(StoreError::MissingId("enrollment"))?;
                    guard.enrollments.insert(id.as_i64(), enrollment);
                }
                StagedWrite::UpdateCourse(course) => {
                    let id = course.id.ok_or(StoreError::MissingId("course"))?;
                    guard.courses.insert(id.as_i64(), course);
                }
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Dropping the guard releases the lock; staged writes are discarded.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::EnrollmentStatus;

    fn course() -> Course {
        Course::new("RUST-101", "Intro to Rust", "Basics", "programming", 10)
    }

    fn student(email: &str) -> Student {
        Student::new("S-2026-0001", email, "$2b$12$hash", "Ada", "+62-811")
    }

    #[tokio::test]
    async fn insert_course_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let first = store.insert_course(&course()).await.unwrap();
        let second = store.insert_course(&course()).await.unwrap();
        assert_eq!(first.id, Some(CourseId::new(1)));
        assert_eq!(second.id, Some(CourseId::new(2)));
    }

    #[tokio::test]
    async fn find_course_roundtrips() {
        let store = InMemoryStore::new();
        let inserted = store.insert_course(&course()).await.unwrap();
        let found = store.find_course(inserted.id.unwrap()).await.unwrap();
        assert_eq!(found, Some(inserted));
    }

    #[tokio::test]
    async fn list_courses_filters_by_status() {
        let store = InMemoryStore::new();
        let mut published = course();
        published.publish();
        store.insert_course(&published).await.unwrap();
        store.insert_course(&course()).await.unwrap();

        let filter = CourseFilter {
            status: Some(domain::CourseStatus::Published),
            category: None,
        };
        let courses = store.list_courses(&filter).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert!(courses[0].status.is_published());
    }

    #[tokio::test]
    async fn search_matches_title_case_insensitively() {
        let store = InMemoryStore::new();
        store.insert_course(&course()).await.unwrap();
        let hits = store.search_courses("intro").await.unwrap();
        assert_eq!(hits.len(), 1);
        let misses = store.search_courses("cooking").await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn committed_txn_writes_become_visible() {
        let store = InMemoryStore::new();
        let course = store.insert_course(&course()).await.unwrap();
        let student = store.insert_student(&student("a@b.com")).await.unwrap();

        let mut txn = store.begin_enrollment().await.unwrap();
        let enrollment = Enrollment::new(student.id.unwrap(), course.id.unwrap());
        let inserted = txn.insert_enrollment(&enrollment).await.unwrap();
        txn.commit().await.unwrap();

        let found = store.find_enrollment(inserted.id.unwrap()).await.unwrap();
        assert_eq!(found.map(|e| e.status), Some(EnrollmentStatus::Active));
        assert_eq!(
            store
                .count_active_by_course(course.id.unwrap())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn rolled_back_txn_writes_are_discarded() {
        let store = InMemoryStore::new();
        let course = store.insert_course(&course()).await.unwrap();
        let student = store.insert_student(&student("a@b.com")).await.unwrap();

        let mut txn = store.begin_enrollment().await.unwrap();
        let enrollment = Enrollment::new(student.id.unwrap(), course.id.unwrap());
        let inserted = txn.insert_enrollment(&enrollment).await.unwrap();
        txn.rollback().await.unwrap();

        let found = store.find_enrollment(inserted.id.unwrap()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn dropping_a_txn_behaves_like_rollback() {
        let store = InMemoryStore::new();
        let course = store.insert_course(&course()).await.unwrap();

        {
            let mut txn = store.begin_enrollment().await.unwrap();
            let mut updated = course.clone();
            updated.on_enroll();
            txn.update_course(&updated).await.unwrap();
            // txn dropped here without commit
        }

        let found = store.find_course(course.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.current_enrolled, 0);
    }

    #[tokio::test]
    async fn enrollments_by_student_orders_newest_first() {
        let store = InMemoryStore::new();
        let student = store.insert_student(&student("a@b.com")).await.unwrap();
        let first_course = store.insert_course(&course()).await.unwrap();
        let second_course = store.insert_course(&course()).await.unwrap();

        let mut early = Enrollment::new(student.id.unwrap(), first_course.id.unwrap());
        early.enrolled_at = chrono::Utc::now() - chrono::Duration::hours(1);
        let mut txn = store.begin_enrollment().await.unwrap();
        txn.insert_enrollment(&early).await.unwrap();
        txn.commit().await.unwrap();

        let late = Enrollment::new(student.id.unwrap(), second_course.id.unwrap());
        let mut txn = store.begin_enrollment().await.unwrap();
        txn.insert_enrollment(&late).await.unwrap();
        txn.commit().await.unwrap();

        let list = store
            .enrollments_by_student(student.id.unwrap())
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].course_id, second_course.id.unwrap());
        assert_eq!(list[1].course_id, first_course.id.unwrap());
    }
}
