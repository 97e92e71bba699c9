use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_enrollments, drop_enrollment, grade_enrollment, list_student_enrollments,
};

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_enrollments))
        .route("/student/{id}", get(list_student_enrollments))
        .route("/{id}/drop", post(drop_enrollment))
        .route("/{id}/grade", post(grade_enrollment))
}
