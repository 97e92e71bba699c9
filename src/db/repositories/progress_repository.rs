use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{
    AssignmentSubmission, ContentProgress, NewAssignmentSubmission, NewQuizAttempt, ProgressWrite,
    QuizAttempt, SubmissionGrade,
};

use super::{ProgressStore, StoreResult};

const PROGRESS_COLUMNS: &str = "id, content_block_id, user_id, is_completed, time_spent_seconds, \
                                completion_data, completed_at, created_at, updated_at";

const ATTEMPT_COLUMNS: &str = "id, content_block_id, user_id, attempt_number, score, max_score, \
                               percentage, is_passed, is_examination, time_spent_seconds, \
                               started_at, completed_at, answers, created_at";

const SUBMISSION_COLUMNS: &str = "id, content_block_id, user_id, submission_text, submission_files, \
                                  status, score, max_score, percentage, is_passed, feedback, \
                                  graded_by, graded_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressStore for PgProgressRepository {
    async fn get_progress_by_user_and_block(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Option<ContentProgress>> {
        sqlx::query_as::<_, ContentProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM content_progress WHERE user_id = $1 AND content_block_id = $2"
        ))
        .bind(user_id)
        .bind(content_block_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_user_progress_by_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> StoreResult<Vec<ContentProgress>> {
        sqlx::query_as::<_, ContentProgress>(
            r#"
            SELECT cp.id, cp.content_block_id, cp.user_id, cp.is_completed, cp.time_spent_seconds,
                   cp.completion_data, cp.completed_at, cp.created_at, cp.updated_at
            FROM content_progress cp
            JOIN content_blocks cb ON cb.id = cp.content_block_id
            WHERE cp.user_id = $1 AND cb.session_id = $2
            "#,
        )
        .bind(user_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn upsert_progress(&self, write: &ProgressWrite) -> StoreResult<ContentProgress> {
        sqlx::query_as::<_, ContentProgress>(&format!(
            r#"
            INSERT INTO content_progress
                (content_block_id, user_id, is_completed, time_spent_seconds, completion_data, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, content_block_id) DO UPDATE SET
                is_completed = EXCLUDED.is_completed,
                time_spent_seconds = EXCLUDED.time_spent_seconds,
                completion_data = EXCLUDED.completion_data,
                completed_at = EXCLUDED.completed_at,
                updated_at = NOW()
            RETURNING {PROGRESS_COLUMNS}
            "#
        ))
        .bind(write.content_block_id)
        .bind(write.user_id)
        .bind(write.is_completed)
        .bind(write.time_spent_seconds)
        .bind(write.completion_data.clone())
        .bind(write.completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_quiz_attempts_by_user(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Vec<QuizAttempt>> {
        sqlx::query_as::<_, QuizAttempt>(&format!(
            r#"
            SELECT {ATTEMPT_COLUMNS}
            FROM quiz_attempts
            WHERE user_id = $1 AND content_block_id = $2
            ORDER BY created_at
            "#
        ))
        .bind(user_id)
        .bind(content_block_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn create_quiz_attempt(&self, attempt: &NewQuizAttempt) -> StoreResult<QuizAttempt> {
        sqlx::query_as::<_, QuizAttempt>(&format!(
            r#"
            INSERT INTO quiz_attempts
                (content_block_id, user_id, attempt_number, score, max_score, percentage,
                 is_passed, is_examination, time_spent_seconds, started_at, completed_at, answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ATTEMPT_COLUMNS}
            "#
        ))
        .bind(attempt.content_block_id)
        .bind(attempt.user_id)
        .bind(attempt.attempt_number)
        .bind(attempt.score)
        .bind(attempt.max_score)
        .bind(attempt.percentage)
        .bind(attempt.is_passed)
        .bind(attempt.is_examination)
        .bind(attempt.time_spent_seconds)
        .bind(attempt.started_at)
        .bind(attempt.completed_at)
        .bind(attempt.answers.clone())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_assignment_submission_by_user(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Option<AssignmentSubmission>> {
        sqlx::query_as::<_, AssignmentSubmission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM assignment_submissions WHERE user_id = $1 AND content_block_id = $2"
        ))
        .bind(user_id)
        .bind(content_block_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn create_assignment_submission(
        &self,
        submission: &NewAssignmentSubmission,
    ) -> StoreResult<AssignmentSubmission> {
        sqlx::query_as::<_, AssignmentSubmission>(&format!(
            r#"
            INSERT INTO assignment_submissions
                (content_block_id, user_id, submission_text, submission_files)
            VALUES ($1, $2, $3, $4)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(submission.content_block_id)
        .bind(submission.user_id)
        .bind(submission.submission_text.clone())
        .bind(submission.submission_files.clone())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn grade_assignment_submission(
        &self,
        submission_id: Uuid,
        grade: &SubmissionGrade,
    ) -> StoreResult<AssignmentSubmission> {
        sqlx::query_as::<_, AssignmentSubmission>(&format!(
            r#"
            UPDATE assignment_submissions
            SET status = 'graded',
                score = $1,
                max_score = $2,
                percentage = $3,
                is_passed = $4,
                feedback = $5,
                graded_by = $6,
                graded_at = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(grade.score)
        .bind(grade.max_score)
        .bind(grade.percentage)
        .bind(grade.is_passed)
        .bind(grade.feedback.clone())
        .bind(grade.graded_by)
        .bind(grade.graded_at)
        .bind(submission_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
