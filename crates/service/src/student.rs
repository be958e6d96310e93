//! Student CRUD service.

use common::StudentId;
use domain::Student;
use store::StudentStore;

use crate::auth;
use crate::error::{Result, ServiceError};

/// Fields for registering a new student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_number: String,
    pub email: String,
    /// Plaintext password; hashed before the entity is built.
    pub password: String,
    pub name: String,
    pub phone: String,
    pub enroll_limit: Option<i32>,
}

/// Partial update of an existing student; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateStudent {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub enroll_limit: Option<i32>,
}

/// CRUD operations for students.
#[derive(Clone)]
pub struct StudentService<S> {
    store: S,
}

impl<S: StudentStore> StudentService<S> {
    /// Creates a new student service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists all students, newest first.
    pub async fn get_students(&self) -> Result<Vec<Student>> {
        Ok(self.store.list_students().await?)
    }

    /// Loads a single student.
    pub async fn get_student(&self, id: StudentId) -> Result<Student> {
        self.store
            .find_student(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Student",
                id: id.as_i64(),
            })
    }

    /// Registers a new student after validating their fields.
    #[tracing::instrument(skip(self, data), fields(student_number = %data.student_number))]
    pub async fn create_student(&self, data: NewStudent) -> Result<Student> {
        let password_hash = auth::hash_password(&data.password)?;

        let mut student = Student::new(
            data.student_number,
            data.email,
            password_hash,
            data.name,
            data.phone,
        );
        if let Some(enroll_limit) = data.enroll_limit {
            student.enroll_limit = enroll_limit;
        }
        student.validate()?;

        Ok(self.store.insert_student(&student).await?)
    }

    /// Merges the given fields into an existing student and persists them.
    #[tracing::instrument(skip(self, data))]
    pub async fn update_student(&self, id: StudentId, data: UpdateStudent) -> Result<Student> {
        let mut student = self.get_student(id).await?;

        if let Some(email) = data.email {
            student.email = email;
        }
        if let Some(name) = data.name {
            student.name = name;
        }
        if let Some(phone) = data.phone {
            student.phone = phone;
        }
        if let Some(enroll_limit) = data.enroll_limit {
            student.enroll_limit = enroll_limit;
        }
        student.updated_at = Some(chrono::Utc::now());
        student.validate()?;

        self.store.update_student(&student).await?;
        Ok(student)
    }

    /// Deletes a student.
    #[tracing::instrument(skip(self))]
    pub async fn delete_student(&self, id: StudentId) -> Result<()> {
        if !self.store.delete_student(id).await? {
            return Err(ServiceError::NotFound {
                entity: "Student",
                id: id.as_i64(),
            });
        }
        Ok(())
    }
}
