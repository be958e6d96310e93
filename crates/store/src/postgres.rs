use async_trait::async_trait;
use common::{CourseId, EnrollmentId, InstructorId, StudentId};
use domain::{Course, Enrollment, Instructor, Student};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::store::{
    CourseFilter, CourseStore, EnrollmentStore, EnrollmentTxn, InstructorStore, StudentStore,
};
use crate::{Result, StoreError};

const COURSE_COLUMNS: &str = "id, course_code, title, description, category, status, \
     max_students, current_enrolled, created_at, updated_at";

const STUDENT_COLUMNS: &str = "id, student_number, email, password_hash, name, phone, \
     enroll_limit, created_at, updated_at";

const INSTRUCTOR_COLUMNS: &str = "id, instructor_code, email, password_hash, name, phone, \
     expertise, created_at, updated_at";

const ENROLLMENT_COLUMNS: &str =
    "id, student_id, course_id, status, enrolled_at, created_at, updated_at";

/// PostgreSQL-backed store implementation.
///
/// Holds a connection pool injected at construction; repositories never
/// reach for a process-wide database handle.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

fn row_to_course(row: &PgRow) -> Result<Course> {
    Ok(Course {
        id: Some(CourseId::new(row.try_get("id")?)),
        course_code: row.try_get("course_code")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        status: row
            .try_get::<String, _>("status")?
            .parse()
            .map_err(StoreError::Decode)?,
        max_students: row.try_get("max_students")?,
        current_enrolled: row.try_get("current_enrolled")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_student(row: &PgRow) -> Result<Student> {
    Ok(Student {
        id: Some(StudentId::new(row.try_get("id")?)),
        student_number: row.try_get("student_number")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        enroll_limit: row.try_get("enroll_limit")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_instructor(row: &PgRow) -> Result<Instructor> {
    Ok(Instructor {
        id: Some(InstructorId::new(row.try_get("id")?)),
        instructor_code: row.try_get("instructor_code")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        expertise: row.try_get("expertise")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_enrollment(row: &PgRow) -> Result<Enrollment> {
    Ok(Enrollment {
        id: Some(EnrollmentId::new(row.try_get("id")?)),
        student_id: StudentId::new(row.try_get("student_id")?),
        course_id: CourseId::new(row.try_get("course_id")?),
        status: row
            .try_get::<String, _>("status")?
            .parse()
            .map_err(StoreError::Decode)?,
        enrolled_at: row.try_get("enrolled_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CourseStore for PostgresStore {
    async fn find_course(&self, id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_course).transpose()
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        let row = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE course_code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_course).transpose()
    }

    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        // Build the query dynamically from the provided filters
        let mut sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE 1=1");
        let mut param = 0;

        if filter.status.is_some() {
            param += 1;
            sql.push_str(&format!(" AND status = ${param}"));
        }
        if filter.category.is_some() {
            param += 1;
            sql.push_str(&format!(" AND category = ${param}"));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_course).collect()
    }

    async fn search_courses(&self, term: &str) -> Result<Vec<Course>> {
        let pattern = format!("%{term}%");
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE title ILIKE $1 OR description ILIKE $1 OR category ILIKE $1 \
             ORDER BY title ASC"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_course).collect()
    }

    async fn insert_course(&self, course: &Course) -> Result<Course> {
        tracing::debug!(course_code = %course.course_code, "inserting course");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO courses \
             (course_code, title, description, category, status, max_students, \
              current_enrolled, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(&course.course_code)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category)
        .bind(course.status.as_str())
        .bind(course.max_students)
        .bind(course.current_enrolled)
        .bind(course.created_at)
        .bind(course.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Course {
            id: Some(CourseId::new(id)),
            ..course.clone()
        })
    }

    async fn update_course(&self, course: &Course) -> Result<()> {
        let id = course.id.ok_or(StoreError::MissingId("course"))?;

        sqlx::query(
            "UPDATE courses SET course_code = $1, title = $2, description = $3, \
             category = $4, status = $5, max_students = $6, current_enrolled = $7, \
             updated_at = $8 WHERE id = $9",
        )
        .bind(&course.course_code)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category)
        .bind(course.status.as_str())
        .bind(course.max_students)
        .bind(course.current_enrolled)
        .bind(course.updated_at)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StudentStore for PostgresStore {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>> {
        let row = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_student).transpose()
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        let row = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_student).transpose()
    }

    async fn list_students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_student).collect()
    }

    async fn insert_student(&self, student: &Student) -> Result<Student> {
        tracing::debug!(student_number = %student.student_number, "inserting student");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO students \
             (student_number, email, password_hash, name, phone, enroll_limit, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(&student.student_number)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(&student.name)
        .bind(&student.phone)
        .bind(student.enroll_limit)
        .bind(student.created_at)
        .bind(student.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Student {
            id: Some(StudentId::new(id)),
            ..student.clone()
        })
    }

    async fn update_student(&self, student: &Student) -> Result<()> {
        let id = student.id.ok_or(StoreError::MissingId("student"))?;

        sqlx::query(
            "UPDATE students SET email = $1, name = $2, phone = $3, enroll_limit = $4, \
             updated_at = $5 WHERE id = $6",
        )
        .bind(&student.email)
        .bind(&student.name)
        .bind(&student.phone)
        .bind(student.enroll_limit)
        .bind(student.updated_at)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_student(&self, id: StudentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InstructorStore for PostgresStore {
    async fn find_instructor(&self, id: InstructorId) -> Result<Option<Instructor>> {
        let row = sqlx::query(&format!(
            "SELECT {INSTRUCTOR_COLUMNS} FROM instructors WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_instructor).transpose()
    }

    async fn find_instructor_by_email(&self, email: &str) -> Result<Option<Instructor>> {
        let row = sqlx::query(&format!(
            "SELECT {INSTRUCTOR_COLUMNS} FROM instructors WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_instructor).transpose()
    }

    async fn insert_instructor(&self, instructor: &Instructor) -> Result<Instructor> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO instructors \
             (instructor_code, email, password_hash, name, phone, expertise, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(&instructor.instructor_code)
        .bind(&instructor.email)
        .bind(&instructor.password_hash)
        .bind(&instructor.name)
        .bind(&instructor.phone)
        .bind(&instructor.expertise)
        .bind(instructor.created_at)
        .bind(instructor.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Instructor {
            id: Some(InstructorId::new(id)),
            ..instructor.clone()
        })
    }
}

#[async_trait]
impl EnrollmentStore for PostgresStore {
    async fn find_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_enrollment).transpose()
    }

    async fn find_by_course_and_student(
        &self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Option<Enrollment>> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE course_id = $1 AND student_id = $2"
        ))
        .bind(course_id.as_i64())
        .bind(student_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_enrollment).transpose()
    }

    async fn enrollments_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE student_id = $1 ORDER BY enrolled_at DESC"
        ))
        .bind(student_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_enrollment).collect()
    }

    async fn count_active_by_course(&self, course_id: CourseId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND status = 'active'",
        )
        .bind(course_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_active_by_student(&self, student_id: StudentId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE student_id = $1 AND status = 'active'",
        )
        .bind(student_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
        let id = enrollment.id.ok_or(StoreError::MissingId("enrollment"))?;

        sqlx::query("UPDATE enrollments SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(enrollment.status.as_str())
            .bind(enrollment.updated_at)
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn begin_enrollment(&self) -> Result<Box<dyn EnrollmentTxn>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresEnrollmentTxn { tx }))
    }
}

/// Unit of work backed by a PostgreSQL transaction.
///
/// `find_course_for_update` issues `SELECT ... FOR UPDATE`, so the capacity
/// check and the counter increment appear atomic relative to concurrent
/// units of work even at read-committed isolation.
struct PostgresEnrollmentTxn {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EnrollmentTxn for PostgresEnrollmentTxn {
    async fn find_course_for_update(&mut self, id: CourseId) -> Result<Option<Course>> {
        let row = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(row_to_course).transpose()
    }

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>> {
        let row = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(row_to_student).transpose()
    }

    async fn find_enrollment(&mut self, id: EnrollmentId) -> Result<Option<Enrollment>> {
        // Locked so two concurrent cancels of the same enrollment serialize:
        // the second sees the terminal status instead of decrementing twice.
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(row_to_enrollment).transpose()
    }

    async fn find_by_course_and_student(
        &mut self,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Option<Enrollment>> {
        let row = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
             WHERE course_id = $1 AND student_id = $2"
        ))
        .bind(course_id.as_i64())
        .bind(student_id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(row_to_enrollment).transpose()
    }

    async fn count_active_by_course(&mut self, course_id: CourseId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND status = 'active'",
        )
        .bind(course_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    async fn count_active_by_student(&mut self, student_id: StudentId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM enrollments WHERE student_id = $1 AND status = 'active'",
        )
        .bind(student_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count)
    }

    async fn insert_enrollment(&mut self, enrollment: &Enrollment) -> Result<Enrollment> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO enrollments \
             (student_id, course_id, status, enrolled_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(enrollment.student_id.as_i64())
        .bind(enrollment.course_id.as_i64())
        .bind(enrollment.status.as_str())
        .bind(enrollment.enrolled_at)
        .bind(enrollment.created_at)
        .bind(enrollment.updated_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(Enrollment {
            id: Some(EnrollmentId::new(id)),
            ..enrollment.clone()
        })
    }

    async fn update_enrollment(&mut self, enrollment: &Enrollment) -> Result<()> {
        let id = enrollment.id.ok_or(StoreError::MissingId("enrollment"))?;

        sqlx::query("UPDATE enrollments SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(enrollment.status.as_str())
            .bind(enrollment.updated_at)
            .bind(id.as_i64())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn update_course(&mut self, course: &Course) -> Result<()> {
        let id = course.id.ok_or(StoreError::MissingId("course"))?;

        sqlx::query(
            "UPDATE courses SET status = $1, current_enrolled = $2, updated_at = $3 \
             WHERE id = $4",
        )
        .bind(course.status.as_str())
        .bind(course.current_enrolled)
        .bind(course.updated_at)
        .bind(id.as_i64())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
