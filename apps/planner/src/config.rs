use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
///
/// The provider credential is optional: a missing key is not a startup error,
/// every suggestion request then fails through the fetcher's error path.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub gemini_api_base: String,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            llm_timeout: parse_llm_timeout(optional_env("LLM_TIMEOUT_SECS").as_deref())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parses `LLM_TIMEOUT_SECS`; unset means the default, zero is rejected.
fn parse_llm_timeout(raw: Option<&str>) -> Result<Duration> {
    let secs = match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
        None => DEFAULT_LLM_TIMEOUT_SECS,
    };
    if secs == 0 {
        bail!("LLM_TIMEOUT_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

/// Reads an env var, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_timeout_defaults_when_unset() {
        assert_eq!(
            parse_llm_timeout(None).unwrap(),
            Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_llm_timeout_parses_seconds() {
        assert_eq!(parse_llm_timeout(Some("30")).unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_llm_timeout_rejects_zero_and_garbage() {
        let err = parse_llm_timeout(Some("0")).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
        assert!(parse_llm_timeout(Some("soon")).is_err());
    }
}
