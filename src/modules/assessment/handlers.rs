use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{
    AssignmentSubmission, NewAssignmentSubmission, PgContentRepository, PgProgressRepository,
};
use crate::error::{AppError, AppResult};

use super::service::{AssessmentService, AttemptOutcome};

fn service(state: &AppState) -> AssessmentService<PgContentRepository, PgProgressRepository> {
    AssessmentService::new(
        PgContentRepository::new(state.db.clone()),
        PgProgressRepository::new(state.db.clone()),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    pub user_id: Uuid,
    pub answers: HashMap<Uuid, Value>,
    #[validate(range(min = 0))]
    pub time_spent_seconds: i32,
}

pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(content_block_id): Path<Uuid>,
    Json(request): Json<SubmitAttemptRequest>,
) -> AppResult<Json<AttemptOutcome>> {
    request.validate()?;
    let outcome = service(&state)
        .submit_attempt(
            content_block_id,
            request.user_id,
            &request.answers,
            request.time_spent_seconds,
        )
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAssignmentRequest {
    pub user_id: Uuid,
    pub submission_text: Option<String>,
    pub submission_files: Option<Value>,
}

pub async fn submit_assignment(
    State(state): State<AppState>,
    Path(content_block_id): Path<Uuid>,
    Json(request): Json<SubmitAssignmentRequest>,
) -> AppResult<Json<AssignmentSubmission>> {
    request.validate()?;
    if request.submission_text.is_none() && request.submission_files.is_none() {
        return Err(AppError::Validation(
            "Submission text or files are required".to_string(),
        ));
    }
    let submission = service(&state)
        .submit_assignment(NewAssignmentSubmission {
            content_block_id,
            user_id: request.user_id,
            submission_text: request.submission_text,
            submission_files: request.submission_files,
        })
        .await?;
    Ok(Json(submission))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradeAssignmentRequest {
    pub user_id: Uuid,
    pub graded_by: Uuid,
    #[validate(range(min = 0))]
    pub score: i32,
    #[validate(range(min = 1))]
    pub max_score: i32,
    pub feedback: Option<String>,
}

pub async fn grade_assignment(
    State(state): State<AppState>,
    Path(content_block_id): Path<Uuid>,
    Json(request): Json<GradeAssignmentRequest>,
) -> AppResult<Json<AssignmentSubmission>> {
    request.validate()?;
    let graded = service(&state)
        .grade_assignment(
            content_block_id,
            request.user_id,
            request.graded_by,
            request.score,
            request.max_score,
            request.feedback,
        )
        .await?;
    Ok(Json(graded))
}
