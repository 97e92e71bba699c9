use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// Academic-record view of a student, as synchronized from the
/// institutional records system. Only the fields feeding semester
/// derivation are carried here.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub program_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub program_type: Option<String>,
    pub batch_year: Option<i32>,
    pub year_of_study: Option<String>,
    pub current_semester: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
