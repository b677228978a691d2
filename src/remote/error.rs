//! Shared error handling for the account service client.
//!
//! Wraps HTTP failures with enough structure to build a readable toast
//! message while preserving the status code for logging.

use std::fmt;

use crate::error::RooftopError;

/// API error raised by the account service.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if the server responded at all
    pub status: Option<reqwest::StatusCode>,
    /// Retry-After header value in seconds, if present
    pub retry_after: Option<u64>,
    /// Human-readable error message
    pub message: String,
    /// The endpoint that failed, for context
    pub endpoint: &'static str,
}

impl ApiError {
    pub fn new(message: impl Into<String>, endpoint: &'static str) -> Self {
        Self {
            status: None,
            retry_after: None,
            message: message.into(),
            endpoint,
        }
    }

    pub fn with_status(
        message: impl Into<String>,
        endpoint: &'static str,
        status: reqwest::StatusCode,
    ) -> Self {
        Self {
            status: Some(status),
            retry_after: None,
            message: message.into(),
            endpoint,
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status.map(|s| s.as_u16() == 429).unwrap_or(false)
    }

    pub fn is_transient(&self) -> bool {
        self.status.map(|s| s.is_server_error()).unwrap_or(false)
    }

    fn to_rooftop_error(&self) -> RooftopError {
        if let Some(status) = self.status {
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            let mut message = format!(
                "{} ({} {}): {}",
                self.endpoint,
                status.as_u16(),
                status_text,
                self.message
            );
            if self.is_rate_limited() {
                let wait = self.retry_after.unwrap_or(60);
                message.push_str(&format!(" (retry after {}s)", wait));
            }
            RooftopError::Api(message)
        } else {
            RooftopError::Api(format!("{}: {}", self.endpoint, self.message))
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ApiError> for RooftopError {
    fn from(error: ApiError) -> Self {
        error.to_rooftop_error()
    }
}
