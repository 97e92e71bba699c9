use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

use super::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "content_block_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlockType {
    Video,
    Text,
    Pdf,
    Quiz,
    Assignment,
    Examination,
}

impl ContentBlockType {
    pub fn is_assessable(&self) -> bool {
        matches!(self, ContentBlockType::Quiz | ContentBlockType::Examination)
    }
}

/// A unit of consumable content inside a session. Authored elsewhere;
/// read-only to this service.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: String,
    pub block_type: ContentBlockType,
    pub is_required: bool,
    pub order_index: i32,
    pub quiz_data: Option<serde_json::Value>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl ContentBlock {
    /// Questions embedded in `quiz_data`, either as a bare array or under a
    /// `questions` key. Returns `None` when nothing parseable is embedded,
    /// in which case callers fall back to the legacy question store.
    pub fn embedded_questions(&self) -> Option<Vec<Question>> {
        let data = self.quiz_data.as_ref()?;
        let raw = match data {
            serde_json::Value::Array(_) => data.clone(),
            serde_json::Value::Object(map) => map.get("questions")?.clone(),
            _ => return None,
        };
        match serde_json::from_value::<Vec<Question>>(raw) {
            Ok(questions) if !questions.is_empty() => Some(questions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CourseSession {
    pub id: Uuid,
    pub lesson_plan_id: Uuid,
    pub title: String,
    pub order_index: i32,
}
