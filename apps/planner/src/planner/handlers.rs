//! Axum route handlers for the planner page and JSON API.

use axum::{extract::State, response::Html, Form, Json};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::planner::fetcher::Suggestion;
use crate::planner::models::TripForm;
use crate::planner::render::{render_page, Outcome, PageState};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    #[serde(flatten)]
    pub suggestion: Suggestion,
    /// Display text: the model output, the sentinel warning, or the prefixed error.
    pub text: String,
}

/// The date picker's lower bound, evaluated per request.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// GET /
pub async fn handle_index() -> Html<String> {
    render_page(&PageState::blank(today()))
}

/// POST /plan
///
/// Validates the submitted form; only a valid submission reaches the fetcher.
/// Always re-renders the page with the submitted values.
pub async fn handle_plan(State(state): State<AppState>, Form(form): Form<TripForm>) -> Html<String> {
    let today = today();
    let outcome = match form.validate(today) {
        Err(issue) => Outcome::Rejected(issue),
        Ok(request) => Outcome::Fetched(state.fetcher.fetch(&request).await),
    };

    render_page(&PageState {
        form,
        today,
        outcome: Some(outcome),
    })
}

/// POST /api/v1/suggestions
///
/// Same flow as the page, as JSON. Provider failures are a 200 with
/// `"outcome": "failed"`; only validation problems are errors.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(form): Json<TripForm>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let request = form.validate(today())?;
    let suggestion = state.fetcher.fetch(&request).await;
    debug!(outcome = suggestion.kind(), "Serving suggestion over JSON API");
    let text = suggestion.clone().into_text();

    Ok(Json(SuggestionResponse { suggestion, text }))
}
