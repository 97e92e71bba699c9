use axum::{routing::post, Router};

use crate::app_state::AppState;

use super::handlers::{grade_assignment, submit_assignment, submit_attempt};

pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/blocks/{id}/attempts", post(submit_attempt))
        .route("/blocks/{id}/submissions", post(submit_assignment))
        .route("/blocks/{id}/submissions/grade", post(grade_assignment))
}
