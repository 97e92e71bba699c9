use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
    Returned,
    Resubmitted,
}

/// At most one submission per (user, block). Grading is a one-way
/// transition from `Submitted` to `Graded`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AssignmentSubmission {
    pub id: Uuid,
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub submission_text: Option<String>,
    pub submission_files: Option<serde_json::Value>,
    pub status: SubmissionStatus,
    pub score: Option<i32>,
    pub max_score: Option<i32>,
    pub percentage: Option<i32>,
    pub is_passed: Option<bool>,
    pub feedback: Option<String>,
    pub graded_by: Option<Uuid>,
    pub graded_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAssignmentSubmission {
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub submission_text: Option<String>,
    pub submission_files: Option<serde_json::Value>,
}

/// Fields written when a submission is graded.
#[derive(Debug, Clone)]
pub struct SubmissionGrade {
    pub score: i32,
    pub max_score: i32,
    pub percentage: i32,
    pub is_passed: bool,
    pub feedback: Option<String>,
    pub graded_by: Uuid,
    pub graded_at: OffsetDateTime,
}
