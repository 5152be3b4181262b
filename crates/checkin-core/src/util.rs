//! Small text helpers for config values and API responses.

/// Longest server message echoed back in an error.
const MAX_ERROR_EXCERPT: usize = 180;

/// Trimmed value, or `None` for missing and blank input.
pub fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Leading part of a response body, for inclusion in error messages.
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_EXCERPT).collect()
}
