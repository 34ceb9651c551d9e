use thiserror::Error;

/// Errors raised while producing a loss table for a source.
///
/// Every variant is terminal for the current render cycle; nothing in the
/// pipeline retries.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    #[error("Cannot coerce field `{field}` in row {row}: {reason}")]
    TypeCoercion {
        field: String,
        row: usize,
        reason: String,
    },

    #[error("Invalid encoded table: {0}")]
    Encoding(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FeedError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(url: &str, status: reqwest::StatusCode, body: &str) -> Self {
        FeedError::Network(format!(
            "GET {} returned {}: {}",
            url,
            status,
            Self::truncate_body(body)
        ))
    }

    pub fn coercion(field: &str, row: usize, reason: impl Into<String>) -> Self {
        FeedError::TypeCoercion {
            field: field.to_string(),
            row,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Network(err.to_string())
    }
}
