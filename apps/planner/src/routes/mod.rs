pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::planner::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Page
        .route("/", get(handlers::handle_index))
        .route("/plan", post(handlers::handle_plan))
        // JSON API
        .route("/api/v1/suggestions", post(handlers::handle_suggestions))
        .with_state(state)
}
