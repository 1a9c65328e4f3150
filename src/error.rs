//! Error types for ETF2L API operations.

use thiserror::Error;

/// Errors that can occur during ETF2L API operations.
#[derive(Debug, Error)]
pub enum Etf2lError {
    /// Client configuration is invalid.
    #[error("Invalid ETF2L client configuration: {0}")]
    InvalidConfig(String),

    /// A caller-supplied argument was rejected before any request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The API answered 404 for the requested path.
    #[error("Not found (404): {path}")]
    NotFound { path: String },

    /// The API answered 429. Not retried; backing off is up to the caller.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status code.
    #[error("Unexpected status code {code}: {message}")]
    UnexpectedStatus { code: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    DecodeFailed(#[from] serde_json::Error),

    /// A value could not be rendered as JSON for output.
    #[error("Failed to encode output: {0}")]
    EncodeFailed(serde_json::Error),

    /// A next-page pointer could not be parsed.
    #[error("Malformed page URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// A next-page pointer referred back to the page that produced it.
    #[error("Pagination cursor loops back to '{path}'")]
    PaginationLoop { path: String },

    /// The cancellation token fired while waiting.
    #[error("Operation cancelled")]
    Cancelled,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Etf2lError {
    /// True for 5xx responses, the only failures the pagination driver
    /// recovers from by skipping a page.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { code, .. } if (500..=599).contains(code))
    }

    /// True if the API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True if the operation was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for ETF2L operations.
pub type Result<T> = core::result::Result<T, Etf2lError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_classification() {
        let err = Etf2lError::UnexpectedStatus {
            code: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(err.is_server_error());

        let err = Etf2lError::UnexpectedStatus {
            code: 418,
            message: "teapot".to_string(),
        };
        assert!(!err.is_server_error());

        assert!(!Etf2lError::RateLimited { retry_after_secs: None }.is_server_error());
        assert!(!Etf2lError::Cancelled.is_server_error());
    }

    #[test]
    fn test_display_includes_status_code() {
        let err = Etf2lError::UnexpectedStatus {
            code: 503,
            message: "maintenance".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("maintenance"));
    }

    #[test]
    fn test_encode_and_decode_failures_are_distinct() {
        let source = || serde_json::from_str::<u32>("x").unwrap_err();

        let decode: Etf2lError = source().into();
        assert!(matches!(decode, Etf2lError::DecodeFailed(_)));

        let encode = Etf2lError::EncodeFailed(source());
        let msg = encode.to_string();
        assert!(msg.starts_with("Failed to encode output"));
        assert!(!msg.contains("decode"));
    }
}
