use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{
    ContentProgress, PgContentRepository, PgEnrollmentRepository, PgProgressRepository,
};
use crate::error::AppResult;

use super::service::{CourseProgress, ProgressService, ProgressUpdate, SessionProgress};

fn service(
    state: &AppState,
) -> ProgressService<PgContentRepository, PgProgressRepository, PgEnrollmentRepository> {
    ProgressService::new(
        PgContentRepository::new(state.db.clone()),
        PgProgressRepository::new(state.db.clone()),
        PgEnrollmentRepository::new(state.db.clone()),
    )
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

pub async fn get_session_progress(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<SessionProgress>> {
    let progress = service(&state)
        .get_session_progress(session_id, query.user_id)
        .await?;
    Ok(Json(progress))
}

#[derive(Debug, Deserialize)]
pub struct StudentQuery {
    pub student_id: Uuid,
}

pub async fn get_course_progress(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
    Query(query): Query<StudentQuery>,
) -> AppResult<Json<CourseProgress>> {
    let progress = service(&state)
        .get_course_progress(subject_id, query.student_id)
        .await?;
    Ok(Json(progress))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    pub user_id: Uuid,
    pub is_completed: bool,
    #[validate(range(min = 0))]
    pub time_spent_seconds: i32,
    pub completion_data: Option<Value>,
    pub enrollment_id: Option<Uuid>,
}

pub async fn update_progress(
    State(state): State<AppState>,
    Path(content_block_id): Path<Uuid>,
    Json(request): Json<UpdateProgressRequest>,
) -> AppResult<Json<ContentProgress>> {
    request.validate()?;
    let record = service(&state)
        .update_progress(ProgressUpdate {
            content_block_id,
            user_id: request.user_id,
            is_completed: request.is_completed,
            time_spent_seconds: request.time_spent_seconds,
            completion_data: request.completion_data,
            enrollment_id: request.enrollment_id,
        })
        .await?;
    Ok(Json(record))
}
