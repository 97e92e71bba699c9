use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// Immutable scoring record for one quiz or examination submission.
/// Never updated after creation; creation order per (user, block) is the
/// ordering key for "previous attempts".
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub attempt_number: i32,
    pub score: i32,
    pub max_score: i32,
    pub percentage: i32,
    pub is_passed: bool,
    pub is_examination: bool,
    pub time_spent_seconds: i32,
    pub started_at: OffsetDateTime,
    pub completed_at: OffsetDateTime,
    pub answers: serde_json::Value,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub attempt_number: i32,
    pub score: i32,
    pub max_score: i32,
    pub percentage: i32,
    pub is_passed: bool,
    pub is_examination: bool,
    pub time_spent_seconds: i32,
    pub started_at: OffsetDateTime,
    pub completed_at: OffsetDateTime,
    pub answers: serde_json::Value,
}
