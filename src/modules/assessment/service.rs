use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::db::{
    AssignmentSubmission, ContentBlock, ContentBlockType, ContentStore, NewAssignmentSubmission,
    NewQuizAttempt, ProgressStore, Question, QuizAttempt, SubmissionGrade, SubmissionStatus,
};
use crate::error::{AppError, AppResult};
use crate::modules::progress::service::apply_progress_write;

use super::grader;

/// Fixed pass mark for quizzes, examinations and assignments.
pub const PASSING_PERCENTAGE: i32 = 70;

#[derive(Debug, Clone, Serialize)]
pub struct AttemptOutcome {
    pub attempt: QuizAttempt,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub feedback: String,
}

pub struct AssessmentService<C, P> {
    content: C,
    progress: P,
}

impl<C, P> AssessmentService<C, P>
where
    C: ContentStore,
    P: ProgressStore,
{
    pub fn new(content: C, progress: P) -> Self {
        Self { content, progress }
    }

    /// Scores one quiz/examination submission and persists it as an
    /// immutable attempt. Examinations allow a single attempt per user;
    /// quizzes are unlimited. Unanswered questions still count toward the
    /// maximum score.
    ///
    /// A passing attempt also marks the block complete through the shared
    /// progress write path; that side effect is best-effort and never
    /// fails the submission.
    pub async fn submit_attempt(
        &self,
        content_block_id: Uuid,
        user_id: Uuid,
        answers: &HashMap<Uuid, Value>,
        time_spent_seconds: i32,
    ) -> AppResult<AttemptOutcome> {
        let block = self
            .content
            .get_content_block_by_id(content_block_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Content block not found".to_string()))?;

        if !block.block_type.is_assessable() {
            return Err(AppError::BusinessRule(
                "Content block is not a quiz or examination".to_string(),
            ));
        }

        let questions = self.load_questions(&block).await?;
        if questions.is_empty() {
            return Err(AppError::Validation(
                "No questions found for this content block".to_string(),
            ));
        }

        let is_examination = block.block_type == ContentBlockType::Examination;
        let prior_attempts = self
            .progress
            .get_quiz_attempts_by_user(user_id, content_block_id)
            .await?;
        if is_examination && !prior_attempts.is_empty() {
            return Err(AppError::BusinessRule(
                "Examinations allow only a single attempt".to_string(),
            ));
        }

        let mut score = 0;
        let mut max_score = 0;
        let mut correct_answers = 0;
        for question in &questions {
            max_score += question.points;
            if let Some(submitted) = answers.get(&question.id) {
                if grader::is_correct(question, submitted) {
                    score += question.points;
                    correct_answers += 1;
                }
            }
        }

        let percentage = if max_score > 0 {
            ((score as f64 / max_score as f64) * 100.0).round() as i32
        } else {
            0
        };
        let is_passed = percentage >= PASSING_PERCENTAGE;
        let attempt_number = prior_attempts.len() as i32 + 1;

        let completed_at = OffsetDateTime::now_utc();
        let attempt = self
            .progress
            .create_quiz_attempt(&NewQuizAttempt {
                content_block_id,
                user_id,
                attempt_number,
                score,
                max_score,
                percentage,
                is_passed,
                is_examination,
                time_spent_seconds,
                started_at: completed_at - Duration::seconds(time_spent_seconds as i64),
                completed_at,
                answers: serde_json::to_value(answers)
                    .map_err(|e| AppError::InternalServerError(e.to_string()))?,
            })
            .await?;

        if is_passed {
            let completion_data = json!({
                "source": if is_examination { "examination" } else { "quiz" },
                "attempt_id": attempt.id,
                "percentage": percentage,
            });
            if let Err(err) = apply_progress_write(
                &self.progress,
                content_block_id,
                user_id,
                true,
                time_spent_seconds,
                Some(completion_data),
            )
            .await
            {
                warn!(%content_block_id, %user_id, error = %err, "Failed to mark content block complete after passed attempt");
            }
        }

        let feedback = feedback_message(percentage, is_passed, attempt_number);

        Ok(AttemptOutcome {
            attempt,
            correct_answers,
            total_questions: questions.len(),
            feedback,
        })
    }

    /// One submission per (user, block); resubmission is rejected once a
    /// submission exists.
    pub async fn submit_assignment(
        &self,
        submission: NewAssignmentSubmission,
    ) -> AppResult<AssignmentSubmission> {
        let block = self
            .content
            .get_content_block_by_id(submission.content_block_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Content block not found".to_string()))?;

        if block.block_type != ContentBlockType::Assignment {
            return Err(AppError::BusinessRule(
                "Content block is not an assignment".to_string(),
            ));
        }

        let existing = self
            .progress
            .get_assignment_submission_by_user(submission.user_id, submission.content_block_id)
            .await?;
        if existing.is_some() {
            return Err(AppError::BusinessRule(
                "An assignment submission already exists for this user".to_string(),
            ));
        }

        Ok(self
            .progress
            .create_assignment_submission(&submission)
            .await?)
    }

    /// One-way transition from submitted to graded. A passing grade marks
    /// the assignment block complete via the same best-effort write path
    /// as quiz passes.
    pub async fn grade_assignment(
        &self,
        content_block_id: Uuid,
        user_id: Uuid,
        graded_by: Uuid,
        score: i32,
        max_score: i32,
        feedback: Option<String>,
    ) -> AppResult<AssignmentSubmission> {
        let submission = self
            .progress
            .get_assignment_submission_by_user(user_id, content_block_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment submission not found".to_string()))?;

        if submission.status == SubmissionStatus::Graded {
            return Err(AppError::BusinessRule(
                "Submission has already been graded".to_string(),
            ));
        }
        if max_score <= 0 || score < 0 || score > max_score {
            return Err(AppError::BusinessRule(format!(
                "Score must be between 0 and {}",
                max_score
            )));
        }

        let percentage = ((score as f64 / max_score as f64) * 100.0).round() as i32;
        let is_passed = percentage >= PASSING_PERCENTAGE;

        let graded = self
            .progress
            .grade_assignment_submission(
                submission.id,
                &SubmissionGrade {
                    score,
                    max_score,
                    percentage,
                    is_passed,
                    feedback,
                    graded_by,
                    graded_at: OffsetDateTime::now_utc(),
                },
            )
            .await?;

        if is_passed {
            let completion_data = json!({
                "source": "assignment",
                "submission_id": graded.id,
                "percentage": percentage,
            });
            if let Err(err) = apply_progress_write(
                &self.progress,
                content_block_id,
                user_id,
                true,
                0,
                Some(completion_data),
            )
            .await
            {
                warn!(%content_block_id, %user_id, error = %err, "Failed to mark assignment block complete after grading");
            }
        }

        Ok(graded)
    }

    /// Embedded questions win; the separate question store is a legacy
    /// fallback.
    async fn load_questions(&self, block: &ContentBlock) -> AppResult<Vec<Question>> {
        if let Some(questions) = block.embedded_questions() {
            return Ok(questions);
        }
        Ok(self
            .content
            .get_quiz_questions_by_block_id(block.id)
            .await?)
    }
}

fn feedback_message(percentage: i32, is_passed: bool, attempt_number: i32) -> String {
    if percentage == 100 {
        "Perfect score! Outstanding work!".to_string()
    } else if percentage >= 90 {
        "Great job! You have an excellent grasp of this material.".to_string()
    } else if is_passed {
        "Well done, you passed.".to_string()
    } else {
        format!(
            "You scored {}%. A score of at least {}% is required to pass. This was attempt #{}.",
            percentage, PASSING_PERCENTAGE, attempt_number
        )
    }
}
