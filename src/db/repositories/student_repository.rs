use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::Student;

use super::{StoreResult, StudentStore};

#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentRepository {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            r#"
            SELECT id, user_id, program_id, department_id, program_type, batch_year,
                   year_of_study, current_semester, created_at, updated_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
