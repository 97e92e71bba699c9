use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{Enrollment, PgEnrollmentRepository};
use crate::error::AppResult;

use super::service::EnrollmentService;

fn service(state: &AppState) -> EnrollmentService<PgEnrollmentRepository> {
    EnrollmentService::new(PgEnrollmentRepository::new(state.db.clone()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    pub student_id: Uuid,
    pub academic_year_id: Uuid,
    #[validate(range(min = 1, max = 10))]
    pub semester_number: i16,
    #[validate(length(min = 1))]
    pub subject_ids: Vec<Uuid>,
}

pub async fn create_enrollments(
    State(state): State<AppState>,
    Json(request): Json<EnrollRequest>,
) -> AppResult<Json<Vec<Enrollment>>> {
    request.validate()?;
    let created = service(&state)
        .enroll(
            request.student_id,
            request.academic_year_id,
            request.semester_number,
            &request.subject_ids,
        )
        .await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct SemesterFilter {
    pub semester_number: Option<i16>,
}

pub async fn list_student_enrollments(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(filter): Query<SemesterFilter>,
) -> AppResult<Json<Vec<Enrollment>>> {
    let enrollments = service(&state)
        .list_for_student(student_id, filter.semester_number)
        .await?;
    Ok(Json(enrollments))
}

pub async fn drop_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<Uuid>,
) -> AppResult<Json<Enrollment>> {
    let dropped = service(&state).drop_enrollment(enrollment_id).await?;
    Ok(Json(dropped))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradeRequest {
    #[validate(length(min = 1))]
    pub grade: String,
    #[validate(range(min = 0))]
    pub marks_obtained: i32,
    #[validate(range(min = 1))]
    pub total_marks: i32,
}

pub async fn grade_enrollment(
    State(state): State<AppState>,
    Path(enrollment_id): Path<Uuid>,
    Json(request): Json<GradeRequest>,
) -> AppResult<Json<Enrollment>> {
    request.validate()?;
    let graded = service(&state)
        .assign_grade(
            enrollment_id,
            request.grade,
            request.marks_obtained,
            request.total_marks,
        )
        .await?;
    Ok(Json(graded))
}
