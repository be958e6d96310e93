//! Enrollment service: the transactional core of the system.

use common::{CourseId, EnrollmentId, StudentId};
use domain::{Enrollment, EnrollmentError};
use store::{EnrollmentStore, EnrollmentTxn};

use crate::error::{Result, ServiceError};

/// Orchestrates the enroll / complete / cancel transitions across the
/// Course and Enrollment aggregates.
///
/// Every precondition check and both writes of an `enroll` call run inside
/// one unit of work: either all checks pass and both writes commit, or the
/// first failure aborts the whole transaction. The service performs no
/// local recovery and exposes no partial-success state.
#[derive(Clone)]
pub struct EnrollmentService<S> {
    store: S,
}

impl<S: EnrollmentStore> EnrollmentService<S> {
    /// Creates a new enrollment service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Enrolls a student into a course.
    ///
    /// Preconditions are checked in order, first failure wins:
    /// 1. the course exists,
    /// 2. the student exists,
    /// 3. no enrollment row exists for the (student, course) pair,
    /// 4. the course is published with free capacity,
    /// 5. the student is under their enroll limit.
    ///
    /// On success the enrollment row is inserted and the course's
    /// `current_enrolled` counter incremented, atomically.
    #[tracing::instrument(skip(self))]
    pub async fn enroll(&self, student_id: StudentId, course_id: CourseId) -> Result<Enrollment> {
        let start = std::time::Instant::now();
        metrics::counter!("enrollments_attempted_total").increment(1);

        let mut txn = self.store.begin_enrollment().await?;

        match Self::enroll_in_txn(txn.as_mut(), student_id, course_id).await {
            Ok(enrollment) => {
                txn.commit().await?;
                metrics::counter!("enrollments_created_total").increment(1);
                metrics::histogram!("enrollment_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(%student_id, %course_id, "student enrolled");
                Ok(enrollment)
            }
            Err(err) => {
                txn.rollback().await?;
                metrics::counter!("enrollments_rejected_total").increment(1);
                Err(err)
            }
        }
    }

    async fn enroll_in_txn(
        txn: &mut dyn EnrollmentTxn,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment> {
        // Locking the course row first serializes concurrent enrolls into
        // the same course; the capacity check below stays valid until commit.
        let mut course = txn
            .find_course_for_update(course_id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Course",
                id: course_id.as_i64(),
            })?;

        let student = txn
            .find_student(student_id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Student",
                id: student_id.as_i64(),
            })?;

        if txn
            .find_by_course_and_student(course_id, student_id)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyEnrolled {
                student_id,
                course_id,
            }
            .into());
        }

        let active_count = txn.count_active_by_course(course_id).await?;
        if !course.can_enroll(active_count) {
            return Err(EnrollmentError::CourseUnavailable { course_id }.into());
        }

        let student_active = txn.count_active_by_student(student_id).await?;
        if !student.can_enroll_more(student_active) {
            return Err(EnrollmentError::EnrollLimitReached {
                student_id,
                limit: student.enroll_limit,
            }
            .into());
        }

        let enrollment = Enrollment::new(student_id, course_id);
        enrollment.validate()?;
        let enrollment = txn.insert_enrollment(&enrollment).await?;

        course.on_enroll();
        txn.update_course(&course).await?;

        Ok(enrollment)
    }

    /// Marks an enrollment completed.
    ///
    /// The seat stays historically consumed: completion does not free
    /// capacity, so the course counter is untouched.
    #[tracing::instrument(skip(self))]
    pub async fn complete_enrollment(&self, id: EnrollmentId) -> Result<Enrollment> {
        let mut enrollment =
            self.store
                .find_enrollment(id)
                .await?
                .ok_or(ServiceError::NotFound {
                    entity: "Enrollment",
                    id: id.as_i64(),
                })?;

        enrollment.complete()?;
        self.store.update_enrollment(&enrollment).await?;

        metrics::counter!("enrollments_completed_total").increment(1);
        tracing::info!(enrollment_id = %id, "enrollment completed");
        Ok(enrollment)
    }

    /// Cancels an enrollment, freeing the capacity slot that enroll
    /// consumed.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_enrollment(&self, id: EnrollmentId) -> Result<Enrollment> {
        let mut txn = self.store.begin_enrollment().await?;

        match Self::cancel_in_txn(txn.as_mut(), id).await {
            Ok(enrollment) => {
                txn.commit().await?;
                metrics::counter!("enrollments_cancelled_total").increment(1);
                tracing::info!(enrollment_id = %id, "enrollment cancelled");
                Ok(enrollment)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            }
        }
    }

    async fn cancel_in_txn(txn: &mut dyn EnrollmentTxn, id: EnrollmentId) -> Result<Enrollment> {
        let mut enrollment = txn
            .find_enrollment(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Enrollment",
                id: id.as_i64(),
            })?;

        enrollment.cancel()?;

        if let Some(mut course) = txn.find_course_for_update(enrollment.course_id).await? {
            course.on_cancel_enrollment();
            txn.update_course(&course).await?;
        }

        txn.update_enrollment(&enrollment).await?;

        Ok(enrollment)
    }

    /// Returns all enrollments of a student, most recently enrolled first.
    ///
    /// Pure read; no invariants to enforce.
    #[tracing::instrument(skip(self))]
    pub async fn enrollments_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>> {
        Ok(self.store.enrollments_by_student(student_id).await?)
    }
}
