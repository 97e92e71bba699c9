use uuid::Uuid;

use crate::db::{Enrollment, EnrollmentStore, NewEnrollment};
use crate::error::{AppError, AppResult};

pub struct EnrollmentService<E> {
    enrollments: E,
}

impl<E: EnrollmentStore> EnrollmentService<E> {
    pub fn new(enrollments: E) -> Self {
        Self { enrollments }
    }

    /// Batch-creates one enrollment per subject for the semester. Subjects
    /// the student is already enrolled in for that semester are skipped.
    pub async fn enroll(
        &self,
        student_id: Uuid,
        academic_year_id: Uuid,
        semester_number: i16,
        subject_ids: &[Uuid],
    ) -> AppResult<Vec<Enrollment>> {
        if subject_ids.is_empty() {
            return Err(AppError::Validation(
                "At least one subject is required".to_string(),
            ));
        }
        let new_enrollments: Vec<NewEnrollment> = subject_ids
            .iter()
            .map(|&subject_reference_id| NewEnrollment {
                student_id,
                subject_reference_id,
                semester_number,
                academic_year_id,
            })
            .collect();
        Ok(self.enrollments.bulk_save(&new_enrollments).await?)
    }

    pub async fn list_for_student(
        &self,
        student_id: Uuid,
        semester_number: Option<i16>,
    ) -> AppResult<Vec<Enrollment>> {
        let enrollments = match semester_number {
            Some(semester) => {
                self.enrollments
                    .find_by_student_and_semester(student_id, semester)
                    .await?
            }
            None => self.enrollments.find_by_student_id(student_id).await?,
        };
        Ok(enrollments)
    }

    pub async fn drop_enrollment(&self, enrollment_id: Uuid) -> AppResult<Enrollment> {
        let mut enrollment = self.load(enrollment_id).await?;
        enrollment.mark_dropped()?;
        Ok(self.enrollments.update(&enrollment).await?)
    }

    pub async fn assign_grade(
        &self,
        enrollment_id: Uuid,
        grade: String,
        marks_obtained: i32,
        total_marks: i32,
    ) -> AppResult<Enrollment> {
        let mut enrollment = self.load(enrollment_id).await?;
        enrollment.assign_grade(grade, marks_obtained, total_marks)?;
        Ok(self.enrollments.update(&enrollment).await?)
    }

    async fn load(&self, enrollment_id: Uuid) -> AppResult<Enrollment> {
        self.enrollments
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))
    }
}
