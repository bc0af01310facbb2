use serde::Deserialize;

/// Error body returned by the segment database.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Human-readable message from a failed response body.
///
/// Uses the JSON `message` (or `error`) field when present, the raw text
/// otherwise, and a generic fallback for empty bodies.
pub fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty() && !raw.starts_with('{')).then(|| raw.to_string())
        })
        .unwrap_or_else(|| "request failed".to_string())
}
