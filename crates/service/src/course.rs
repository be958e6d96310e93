//! Course CRUD and publication service.

use common::CourseId;
use domain::Course;
use store::{CourseFilter, CourseStore};

use crate::error::{Result, ServiceError};

/// Fields for creating a new course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub max_students: i32,
}

/// Partial update of an existing course; `None` keeps the stored value.
///
/// The publish state and the `current_enrolled` counter are deliberately
/// absent: the former moves through [`CourseService::publish_course`], the
/// latter only through the enrollment service.
#[derive(Debug, Clone, Default)]
pub struct UpdateCourse {
    pub course_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub max_students: Option<i32>,
}

/// CRUD and publication operations for courses.
#[derive(Clone)]
pub struct CourseService<S> {
    store: S,
}

impl<S: CourseStore> CourseService<S> {
    /// Creates a new course service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists courses, optionally filtered by status and category.
    pub async fn get_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        Ok(self.store.list_courses(filter).await?)
    }

    /// Loads a single course.
    pub async fn get_course(&self, id: CourseId) -> Result<Course> {
        self.store
            .find_course(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Course",
                id: id.as_i64(),
            })
    }

    /// Creates a new draft course after validating its fields.
    #[tracing::instrument(skip(self, data), fields(course_code = %data.course_code))]
    pub async fn create_course(&self, data: NewCourse) -> Result<Course> {
        let course = Course::new(
            data.course_code,
            data.title,
            data.description,
            data.category,
            data.max_students,
        );
        course.validate()?;

        Ok(self.store.insert_course(&course).await?)
    }

    /// Merges the given fields into an existing course and persists it.
    #[tracing::instrument(skip(self, data))]
    pub async fn update_course(&self, id: CourseId, data: UpdateCourse) -> Result<Course> {
        let mut course = self.get_course(id).await?;

        if let Some(course_code) = data.course_code {
            course.course_code = course_code;
        }
        if let Some(title) = data.title {
            course.title = title;
        }
        if let Some(description) = data.description {
            course.description = description;
        }
        if let Some(category) = data.category {
            course.category = category;
        }
        if let Some(max_students) = data.max_students {
            course.max_students = max_students;
        }
        course.updated_at = Some(chrono::Utc::now());
        course.validate()?;

        self.store.update_course(&course).await?;
        Ok(course)
    }

    /// Deletes a course.
    #[tracing::instrument(skip(self))]
    pub async fn delete_course(&self, id: CourseId) -> Result<()> {
        if !self.store.delete_course(id).await? {
            return Err(ServiceError::NotFound {
                entity: "Course",
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    /// Opens a course for enrollment.
    #[tracing::instrument(skip(self))]
    pub async fn publish_course(&self, id: CourseId) -> Result<Course> {
        let mut course = self.get_course(id).await?;
        course.publish();
        course.validate()?;

        self.store.update_course(&course).await?;
        tracing::info!(course_id = %id, "course published");
        Ok(course)
    }

    /// Searches title, description, and category for a term.
    pub async fn search_courses(&self, term: &str) -> Result<Vec<Course>> {
        Ok(self.store.search_courses(term).await?)
    }
}
