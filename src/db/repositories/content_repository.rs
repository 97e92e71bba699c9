use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::error::DatabaseError;
use crate::db::models::{ContentBlock, CourseSession, Question};

use super::{ContentStore, StoreResult};

#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentRepository {
    async fn get_content_block_by_id(&self, id: Uuid) -> StoreResult<Option<ContentBlock>> {
        sqlx::query_as::<_, ContentBlock>(
            r#"
            SELECT id, session_id, title, block_type, is_required, order_index, quiz_data, created_at, updated_at
            FROM content_blocks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_content_blocks_by_session_id(
        &self,
        session_id: Uuid,
    ) -> StoreResult<Vec<ContentBlock>> {
        sqlx::query_as::<_, ContentBlock>(
            r#"
            SELECT id, session_id, title, block_type, is_required, order_index, quiz_data, created_at, updated_at
            FROM content_blocks
            WHERE session_id = $1
            ORDER BY order_index
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_session_by_id(&self, id: Uuid) -> StoreResult<Option<CourseSession>> {
        sqlx::query_as::<_, CourseSession>(
            r#"
            SELECT id, lesson_plan_id, title, order_index
            FROM course_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_session_ids_by_subject_id(&self, subject_id: Uuid) -> StoreResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT cs.id
            FROM course_sessions cs
            JOIN lesson_plans lp ON lp.id = cs.lesson_plan_id
            JOIN syllabi s ON s.id = lp.syllabus_id
            WHERE s.subject_reference_id = $1
            ORDER BY cs.order_index
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn get_quiz_questions_by_block_id(&self, block_id: Uuid) -> StoreResult<Vec<Question>> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_text, question_type, options, correct_answer, points, order_index
            FROM quiz_questions
            WHERE content_block_id = $1
            ORDER BY order_index
            "#,
        )
        .bind(block_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
