mod content_repository;
mod enrollment_repository;
mod progress_repository;
mod student_repository;

pub use content_repository::PgContentRepository;
pub use enrollment_repository::PgEnrollmentRepository;
pub use progress_repository::PgProgressRepository;
pub use student_repository::PgStudentRepository;

use async_trait::async_trait;
use uuid::Uuid;

use super::error::DatabaseError;
use super::models::{
    AssignmentSubmission, ContentBlock, ContentProgress, CourseSession, Enrollment,
    NewAssignmentSubmission, NewEnrollment, NewQuizAttempt, ProgressWrite, Question, QuizAttempt,
    Student, SubmissionGrade,
};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Read-only view of the content/session hierarchy owned by the
/// content-authoring collaborator.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_content_block_by_id(&self, id: Uuid) -> StoreResult<Option<ContentBlock>>;

    async fn get_content_blocks_by_session_id(
        &self,
        session_id: Uuid,
    ) -> StoreResult<Vec<ContentBlock>>;

    async fn get_session_by_id(&self, id: Uuid) -> StoreResult<Option<CourseSession>>;

    /// Every session transitively reachable from the subject via its
    /// syllabus -> lesson-plan -> session chain.
    async fn get_session_ids_by_subject_id(&self, subject_id: Uuid) -> StoreResult<Vec<Uuid>>;

    /// Legacy fallback for blocks without an embedded question list.
    async fn get_quiz_questions_by_block_id(&self, block_id: Uuid) -> StoreResult<Vec<Question>>;
}

/// Progress rows, quiz attempts and assignment submissions.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress_by_user_and_block(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Option<ContentProgress>>;

    async fn get_user_progress_by_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> StoreResult<Vec<ContentProgress>>;

    /// Upsert keyed by (user_id, content_block_id).
    async fn upsert_progress(&self, write: &ProgressWrite) -> StoreResult<ContentProgress>;

    async fn get_quiz_attempts_by_user(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Vec<QuizAttempt>>;

    async fn create_quiz_attempt(&self, attempt: &NewQuizAttempt) -> StoreResult<QuizAttempt>;

    async fn get_assignment_submission_by_user(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Option<AssignmentSubmission>>;

    async fn create_assignment_submission(
        &self,
        submission: &NewAssignmentSubmission,
    ) -> StoreResult<AssignmentSubmission>;

    async fn grade_assignment_submission(
        &self,
        submission_id: Uuid,
        grade: &SubmissionGrade,
    ) -> StoreResult<AssignmentSubmission>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Enrollment>>;

    async fn find_by_student_id(&self, student_id: Uuid) -> StoreResult<Vec<Enrollment>>;

    async fn find_by_student_and_semester(
        &self,
        student_id: Uuid,
        semester_number: i16,
    ) -> StoreResult<Vec<Enrollment>>;

    async fn find_by_student_and_subject(
        &self,
        student_id: Uuid,
        subject_reference_id: Uuid,
    ) -> StoreResult<Option<Enrollment>>;

    async fn update(&self, enrollment: &Enrollment) -> StoreResult<Enrollment>;

    /// Batch-creates enrollments, skipping (student, subject, semester)
    /// duplicates.
    async fn bulk_save(&self, enrollments: &[NewEnrollment]) -> StoreResult<Vec<Enrollment>>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Student>>;
}
