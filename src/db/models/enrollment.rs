use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "enrollment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
    Failed,
}

/// One student enrolled in one subject for one academic term.
///
/// Progress writes go through [`Enrollment::update_progress`] so the
/// auto-complete transition cannot be bypassed.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_reference_id: Uuid,
    pub semester_number: i16,
    pub academic_year_id: Uuid,
    pub status: EnrollmentStatus,
    pub progress_percentage: i32,
    pub completed_at: Option<OffsetDateTime>,
    pub grade: Option<String>,
    pub marks_obtained: Option<i32>,
    pub total_marks: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Enrollment {
    /// Applies a new course completion percentage, clamped to [0, 100].
    ///
    /// Reaching 100 while active completes the enrollment and stamps
    /// `completed_at`. Calling again once completed is a no-op, so the
    /// completion timestamp is never rewritten.
    pub fn update_progress(&mut self, percentage: i32) {
        if self.status != EnrollmentStatus::Active {
            return;
        }
        self.progress_percentage = percentage.clamp(0, 100);
        if self.progress_percentage >= 100 {
            self.status = EnrollmentStatus::Completed;
            self.progress_percentage = 100;
            self.completed_at = Some(OffsetDateTime::now_utc());
        }
    }

    pub fn mark_dropped(&mut self) -> AppResult<()> {
        if self.status == EnrollmentStatus::Completed {
            return Err(AppError::BusinessRule(
                "A completed enrollment cannot be dropped".to_string(),
            ));
        }
        self.status = EnrollmentStatus::Dropped;
        Ok(())
    }

    /// Grade assignment is independent of progress tracking.
    pub fn assign_grade(
        &mut self,
        grade: String,
        marks_obtained: i32,
        total_marks: i32,
    ) -> AppResult<()> {
        if marks_obtained < 0 || marks_obtained > total_marks {
            return Err(AppError::BusinessRule(format!(
                "Marks obtained must be between 0 and {}",
                total_marks
            )));
        }
        self.grade = Some(grade);
        self.marks_obtained = Some(marks_obtained);
        self.total_marks = Some(total_marks);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEnrollment {
    pub student_id: Uuid,
    pub subject_reference_id: Uuid,
    #[validate(range(min = 1, max = 10))]
    pub semester_number: i16,
    pub academic_year_id: Uuid,
}
