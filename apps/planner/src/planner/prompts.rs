// All LLM prompt constants for the planner module.

use crate::llm_client::Prompt;
use crate::planner::models::{TripRequest, DATE_FORMAT};

/// Fixed system instruction describing the assistant's role.
pub const TRAVEL_ASSISTANT_SYSTEM: &str = "You are an AI travel assistant. \
    Provide travel options including cab, train, bus, and flight, \
    with estimated costs, durations, and relevant travel tips. \
    Consider date-specific availability and price fluctuations. \
    Additionally, recommend top tourist spots with travel tips.";

/// Builds the two-message prompt for a validated trip request.
/// Origin and destination are inserted exactly as typed.
pub fn build_trip_prompt(request: &TripRequest) -> Prompt {
    let user = format!(
        "Plan a trip from {origin} to {destination} on {travel_date}. \
        Suggest travel modes with cost and duration.",
        origin = request.origin,
        destination = request.destination,
        travel_date = request.travel_date.format(DATE_FORMAT),
    );
    Prompt::new(TRAVEL_ASSISTANT_SYSTEM, user)
}
