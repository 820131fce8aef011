//! Page rendering as a pure function of `PageState`.
//!
//! Handlers build a `PageState` after every state transition (initial load,
//! rejected submission, finished fetch) and call `render_page`.

use axum::response::Html;
use chrono::NaiveDate;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::planner::fetcher::Suggestion;
use crate::planner::models::{TripForm, ValidationIssue, DATE_FORMAT};

pub const SUCCESS_BANNER: &str = "✅ Here are your travel recommendations:";

const PAGE_STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 0 1.5rem; }
header, footer { text-align: center; }
form { display: grid; gap: 0.75rem; margin-bottom: 1.5rem; }
label { display: grid; gap: 0.25rem; font-weight: 600; }
input, button { font-size: 1rem; padding: 0.5rem; }
.alert { border-radius: 6px; padding: 0.75rem 1rem; margin: 1rem 0; }
.alert.warning { background: #fff8e1; }
.alert.success { background: #e8f5e9; }
.alert.error { background: #ffebee; }
";

/// What the output surface shows below the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rejected(ValidationIssue),
    Fetched(Suggestion),
}

#[derive(Debug, Clone)]
pub struct PageState {
    pub form: TripForm,
    pub today: NaiveDate,
    pub outcome: Option<Outcome>,
}

impl PageState {
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            form: TripForm::default(),
            today,
            outcome: None,
        }
    }
}

pub fn render_page(state: &PageState) -> Html<String> {
    let today = state.today.format(DATE_FORMAT).to_string();
    let travel_date = if state.form.travel_date.trim().is_empty() {
        today.clone()
    } else {
        state.form.travel_date.clone()
    };

    let output = state.outcome.as_ref().map(render_outcome).unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI Travel Planner</title>
<style>{style}</style>
</head>
<body>
<header>
<h1>🌍 Smart Travel Planner</h1>
<p>Get AI-powered travel recommendations effortlessly.</p>
</header>
<hr>
<main>
<h2>Plan Your Journey</h2>
<form method="post" action="/plan">
<label>Source Location<input type="text" name="origin" placeholder="Enter your location" value="{origin}"></label>
<label>Destination<input type="text" name="destination" placeholder="Enter your destination" value="{destination}"></label>
<label>📅 Travel Date<input type="date" name="travel_date" min="{today}" value="{travel_date}"></label>
<button type="submit">🔍 Get Travel Options</button>
</form>
<section id="result">{output}</section>
</main>
<hr>
<footer><p>✨ Powered by Rust &amp; Google Gemini AI ✨</p></footer>
</body>
</html>
"#,
        style = PAGE_STYLE,
        origin = escape_html(&state.form.origin),
        destination = escape_html(&state.form.destination),
        today = today,
        travel_date = escape_html(&travel_date),
        output = output,
    ))
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Rejected(issue) => format!(
            r#"<div class="alert warning">⚠️ {}</div>"#,
            escape_html(&issue.to_string())
        ),
        Outcome::Fetched(Suggestion::Recommendations(text)) => format!(
            r#"<div class="alert success">{SUCCESS_BANNER}</div><article class="recommendations">{}</article>"#,
            markdown_to_html(text)
        ),
        Outcome::Fetched(suggestion @ Suggestion::Empty) => format!(
            r#"<div class="alert warning">{}</div>"#,
            escape_html(&suggestion.clone().into_text())
        ),
        Outcome::Fetched(suggestion @ Suggestion::Failed(_)) => format!(
            r#"<div class="alert error">{}</div>"#,
            escape_html(&suggestion.clone().into_text())
        ),
    }
}

/// Schemes a link or image in model output may point at.
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Renders model markdown to HTML. Raw HTML in the model output is shown as
/// text instead of being passed through to the page, and link or image
/// destinations with any other scheme than `ALLOWED_URL_SCHEMES` become `#`.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keeps relative URLs and those with an allowed scheme; anything else becomes `#`.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore embedded whitespace and control chars when reading the scheme
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let scheme = match compact.split_once(':') {
        // A ':' after the first '/', '?' or '#' belongs to the path, not a scheme
        Some((head, _)) if !head.contains(['/', '?', '#']) => head.to_ascii_lowercase(),
        _ => return url,
    };
    if ALLOWED_URL_SCHEMES.contains(&scheme.as_str()) {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
