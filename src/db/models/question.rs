use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

/// A quiz or examination item.
///
/// `question_type` stays an open string tag (matching what the authoring
/// side stores) so unrecognized types grade as incorrect instead of failing
/// to deserialize. `correct_answer` encoding varies by type: an option
/// index, an array of indices, 0/1 or a boolean, or a bare string.
///
/// Questions arrive either embedded in a content block's `quiz_data` JSON
/// or from the legacy `quiz_questions` table, so this derives both
/// `Deserialize` and `FromRow`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<serde_json::Value>,
    #[serde(default = "default_points")]
    pub points: i32,
    #[serde(default)]
    pub order_index: i32,
}

fn default_points() -> i32 {
    1
}

pub mod question_type {
    pub const SINGLE_CHOICE: &str = "single_choice";
    pub const MULTIPLE_CHOICE: &str = "multiple_choice";
    pub const MULTIPLE_SELECT: &str = "multiple_select";
    pub const TRUE_FALSE: &str = "true_false";
    pub const FILL_IN_BLANK: &str = "fill_in_blank";
    pub const SHORT_ANSWER: &str = "short_answer";
    pub const ESSAY: &str = "essay";
}
