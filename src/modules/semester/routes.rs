use axum::{routing::get, Router};

use crate::app_state::AppState;

use super::handlers::get_current_semester;

pub fn semester_routes() -> Router<AppState> {
    Router::new().route("/current", get(get_current_semester))
}
