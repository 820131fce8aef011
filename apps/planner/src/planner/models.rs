use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Date format used by the date picker, the JSON API and the prompt.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw form values as submitted by the page. Nothing is trimmed or parsed yet.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TripForm {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    /// Empty, missing or `null` means "today", matching the date picker's default.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub travel_date: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated trip query, ready for the suggestion fetcher.
///
/// `origin` and `destination` are kept exactly as the user typed them;
/// trimming only decides whether they count as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub travel_date: NaiveDate,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("Please enter both source and destination locations.")]
    MissingLocation,

    #[error("Travel date '{0}' is not a valid date (expected YYYY-MM-DD).")]
    InvalidDate(String),

    #[error("Travel date {date} is in the past; pick {today} or later.")]
    DateInPast { date: NaiveDate, today: NaiveDate },
}

impl TripForm {
    /// Validates a submission against `today`.
    ///
    /// Location emptiness is checked first so a blank form always yields the
    /// missing-location warning regardless of the date field.
    pub fn validate(&self, today: NaiveDate) -> Result<TripRequest, ValidationIssue> {
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(ValidationIssue::MissingLocation);
        }

        let travel_date = parse_travel_date(&self.travel_date, today)?;

        Ok(TripRequest {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            travel_date,
        })
    }
}

fn parse_travel_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationIssue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(today);
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationIssue::InvalidDate(raw.to_string()))?;
    if date < today {
        return Err(ValidationIssue::DateInPast { date, today });
    }
    Ok(date)
}
