//! Suggestion Fetcher: turns a validated trip request into travel recommendations.
//!
//! Flow: build_trip_prompt → ChatModel::complete → Suggestion.
//!
//! The fetcher never returns an error: provider failures and empty answers are
//! folded into the `Suggestion` outcome so the page can always render something.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::ChatModel;
use crate::planner::models::TripRequest;
use crate::planner::prompts::build_trip_prompt;

/// Shown when the provider answers without any text.
pub const EMPTY_RESPONSE_WARNING: &str = "⚠️ No response received from AI.";

/// Prefix of every failure message; the provider's error description follows it.
pub const FETCH_ERROR_PREFIX: &str = "❌ Error fetching travel options: ";

/// Outcome of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Suggestion {
    /// Model output, verbatim markdown.
    Recommendations(String),
    Empty,
    /// Description of the provider, network or credential failure.
    Failed(String),
}

impl Suggestion {
    pub fn kind(&self) -> &'static str {
        match self {
            Suggestion::Recommendations(_) => "recommendations",
            Suggestion::Empty => "empty",
            Suggestion::Failed(_) => "failed",
        }
    }

    /// The single-string rendering: model text, the sentinel warning, or the
    /// error prefix followed by the failure description.
    pub fn into_text(self) -> String {
        match self {
            Suggestion::Recommendations(text) => text,
            Suggestion::Empty => EMPTY_RESPONSE_WARNING.to_string(),
            Suggestion::Failed(detail) => format!("{FETCH_ERROR_PREFIX}{detail}"),
        }
    }
}

#[derive(Clone)]
pub struct SuggestionFetcher {
    model: Arc<dyn ChatModel>,
}

impl SuggestionFetcher {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn fetch(&self, request: &TripRequest) -> Suggestion {
        let prompt = build_trip_prompt(request);

        match self.model.complete(&prompt).await {
            Ok(Some(text)) => {
                info!(
                    travel_date = %request.travel_date,
                    chars = text.len(),
                    "Travel suggestions received"
                );
                Suggestion::Recommendations(text)
            }
            Ok(None) => {
                warn!(travel_date = %request.travel_date, "LLM returned no content");
                Suggestion::Empty
            }
            Err(e) => {
                warn!("LLM call failed: {e}");
                Suggestion::Failed(e.to_string())
            }
        }
    }
}
