use thiserror::Error;

/// Errors from the segment database client.
#[derive(Debug, Error)]
pub enum IntroDbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("API key missing or not accepted")]
    Unauthorized,

    #[error("invalid submission: {0}")]
    Invalid(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl IntroDbError {
    /// The API reported that nothing is known for the query.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
