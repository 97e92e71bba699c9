use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{get_course_progress, get_session_progress, update_progress};

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}", get(get_session_progress))
        .route("/subjects/{id}", get(get_course_progress))
        .route("/blocks/{id}", post(update_progress))
}
