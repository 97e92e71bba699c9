use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// Per-user, per-content-block completion fact. At most one row per
/// (user_id, content_block_id); created on first interaction and updated
/// in place afterwards.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContentProgress {
    pub id: Uuid,
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub is_completed: bool,
    pub time_spent_seconds: i32,
    pub completion_data: Option<serde_json::Value>,
    pub completed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The full intended state of a progress row for an upsert. The
/// `completed_at` transition rule is applied by the service before this is
/// handed to the store.
#[derive(Debug, Clone)]
pub struct ProgressWrite {
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub is_completed: bool,
    pub time_spent_seconds: i32,
    pub completion_data: Option<serde_json::Value>,
    pub completed_at: Option<OffsetDateTime>,
}
