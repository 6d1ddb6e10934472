/*!
 * Error types for the notemend application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and its body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Map a reqwest send error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the chunked correction pipeline.
///
/// Segment indices are 1-based, matching the progress output.
#[derive(Error, Debug)]
pub enum CorrectionError {
    /// The remote call for a segment failed
    #[error("Transport failure on segment {segment}: {source}")]
    Transport {
        /// Segment that was being dispatched
        segment: usize,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// The service answered with an empty or undecodable payload
    #[error("Malformed response on segment {segment}: {reason}")]
    MalformedResponse {
        /// Segment that was being dispatched
        segment: usize,
        /// What was wrong with the payload
        reason: String,
    },

    /// Pipeline parameters were rejected before any request was sent
    #[error("Invalid correction settings: {0}")]
    InvalidConfig(String),
}

impl CorrectionError {
    /// Wrap a provider error raised while dispatching `segment`
    pub fn from_provider(segment: usize, error: ProviderError) -> Self {
        match error {
            ProviderError::ParseError(reason) => Self::MalformedResponse { segment, reason },
            source => Self::Transport { segment, source },
        }
    }

    /// Malformed responses propagate exactly like transport failures
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::MalformedResponse { .. })
    }

    /// Segment the failure happened on, if any
    pub fn segment(&self) -> Option<usize> {
        match self {
            Self::Transport { segment, .. } | Self::MalformedResponse { segment, .. } => Some(*segment),
            Self::InvalidConfig(_) => None,
        }
    }
}
