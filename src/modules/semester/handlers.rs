use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::PgStudentRepository;
use crate::error::AppResult;

use super::service::{SemesterInfo, SemesterService};

#[derive(Debug, Deserialize)]
pub struct CurrentSemesterQuery {
    pub student_id: Uuid,
}

pub async fn get_current_semester(
    State(state): State<AppState>,
    Query(query): Query<CurrentSemesterQuery>,
) -> AppResult<Json<SemesterInfo>> {
    let service = SemesterService::new(PgStudentRepository::new(state.db.clone()));
    let info = service.current_semester(query.student_id).await?;
    Ok(Json(info))
}
