use crate::planner::fetcher::SuggestionFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: SuggestionFetcher,
}
