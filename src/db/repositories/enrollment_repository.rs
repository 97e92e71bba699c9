use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{Enrollment, NewEnrollment};

use super::{EnrollmentStore, StoreResult};

const ENROLLMENT_COLUMNS: &str = "id, student_id, subject_reference_id, semester_number, \
                                  academic_year_id, status, progress_percentage, completed_at, \
                                  grade, marks_obtained, total_marks, created_at, updated_at";

#[derive(Clone)]
pub struct PgEnrollmentRepository {
    pool: PgPool,
}

impl PgEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentRepository {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_by_student_id(&self, student_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = $1 ORDER BY semester_number, created_at"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_by_student_and_semester(
        &self,
        student_id: Uuid,
        semester_number: i16,
    ) -> StoreResult<Vec<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = $1 AND semester_number = $2 ORDER BY created_at"
        ))
        .bind(student_id)
        .bind(semester_number)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_by_student_and_subject(
        &self,
        student_id: Uuid,
        subject_reference_id: Uuid,
    ) -> StoreResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(&format!(
            r#"
            SELECT {ENROLLMENT_COLUMNS}
            FROM enrollments
            WHERE student_id = $1 AND subject_reference_id = $2
            ORDER BY semester_number DESC
            LIMIT 1
            "#
        ))
        .bind(student_id)
        .bind(subject_reference_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn update(&self, enrollment: &Enrollment) -> StoreResult<Enrollment> {
        sqlx::query_as::<_, Enrollment>(&format!(
            r#"
            UPDATE enrollments
            SET status = $1,
                progress_percentage = $2,
                completed_at = $3,
                grade = $4,
                marks_obtained = $5,
                total_marks = $6,
                updated_at = NOW()
            WHERE id = $7
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        ))
        .bind(enrollment.status)
        .bind(enrollment.progress_percentage)
        .bind(enrollment.completed_at)
        .bind(enrollment.grade.clone())
        .bind(enrollment.marks_obtained)
        .bind(enrollment.total_marks)
        .bind(enrollment.id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn bulk_save(&self, enrollments: &[NewEnrollment]) -> StoreResult<Vec<Enrollment>> {
        let mut saved = Vec::with_capacity(enrollments.len());
        for new in enrollments {
            let row = sqlx::query_as::<_, Enrollment>(&format!(
                r#"
                INSERT INTO enrollments
                    (student_id, subject_reference_id, semester_number, academic_year_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (student_id, subject_reference_id, semester_number) DO NOTHING
                RETURNING {ENROLLMENT_COLUMNS}
                "#
            ))
            .bind(new.student_id)
            .bind(new.subject_reference_id)
            .bind(new.semester_number)
            .bind(new.academic_year_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

            // None means the student was already enrolled; skip silently.
            if let Some(enrollment) = row {
                saved.push(enrollment);
            }
        }
        Ok(saved)
    }
}
