//! Error Handling Module
//!
//! All failures surfaced by this crate are reported through [`LlmError`].
//! Variants are grouped into a small closed set of [`ErrorCategory`] values so
//! callers can tell transient transport failures apart from permanent
//! configuration or authentication problems.
//!
//! # Example
//!
//! ```rust,ignore
//! use siumai_provider_oci::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Prefix used for every error raised while talking to the inference endpoint.
pub const VENDOR_ERROR_PREFIX: &str = "OCI Generative AI API error";

/// Unified error type.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Missing or inconsistent configuration (credentials, endpoint, region).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A generation option is outside its declared range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The caller supplied unusable input (e.g. an empty conversation).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Building credentials or signing a request failed, or the service
    /// rejected the signature.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The service answered without a response body.
    #[error("No response received from OCI Generative AI")]
    EmptyResponse,

    /// The response body lacks `chatResponse.chatResult.response`.
    #[error("No valid response in OCI Generative AI result")]
    MalformedResponse,

    /// The response body is not valid JSON.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON (de)serialization failure outside of response parsing.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Transport-level failure (connect, TLS, body read).
    #[error("OCI Generative AI API error: {0}")]
    HttpError(String),

    /// Non-success HTTP status not covered by a more specific variant.
    #[error("OCI Generative AI API error ({code}): {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The service throttled the request.
    #[error("OCI Generative AI API error: rate limited: {0}")]
    RateLimitError(String),

    /// Model, endpoint or compartment not found.
    #[error("OCI Generative AI API error: not found: {0}")]
    NotFound(String),

    /// The request did not finish before its deadline.
    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// The request was cancelled through a [`crate::utils::cancel::CancelHandle`].
    #[error("Request cancelled")]
    Cancelled,
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Response,
    Transport,
    Client,
    Cancelled,
}

impl LlmError {
    /// Create an API error from a status code and message.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) | Self::InvalidParameter(_) | Self::InvalidInput(_) => {
                ErrorCategory::Configuration
            }
            Self::AuthenticationError(_) => ErrorCategory::Authentication,
            Self::EmptyResponse
            | Self::MalformedResponse
            | Self::ParseError(_)
            | Self::JsonError(_) => ErrorCategory::Response,
            Self::HttpError(_) | Self::TimeoutError(_) | Self::RateLimitError(_) => {
                ErrorCategory::Transport
            }
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Transport,
            Self::ApiError { .. } | Self::NotFound(_) => ErrorCategory::Client,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether retrying the same request may succeed. Nothing in this crate
    /// retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    /// HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::RateLimitError(_) => Some(429),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for LlmError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidParameter(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let llm_err: LlmError = json_err.into();
        assert!(matches!(llm_err, LlmError::JsonError(_)));
    }

    #[test]
    fn transport_errors_keep_cause_and_vendor_prefix() {
        let err = LlmError::HttpError("connection reset by peer".to_string());
        let msg = err.to_string();
        assert!(msg.starts_with(VENDOR_ERROR_PREFIX));
        assert!(msg.contains("connection reset by peer"));
        assert!(err.is_retryable());
    }

    #[test]
    fn response_errors_use_fixed_messages() {
        assert_eq!(
            LlmError::EmptyResponse.to_string(),
            "No response received from OCI Generative AI"
        );
        assert_eq!(
            LlmError::MalformedResponse.to_string(),
            "No valid response in OCI Generative AI result"
        );
        assert_eq!(LlmError::EmptyResponse.category(), ErrorCategory::Response);
    }

    #[test]
    fn api_error_category_depends_on_status() {
        assert_eq!(
            LlmError::api_error(503, "unavailable").category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            LlmError::api_error(409, "conflict").category(),
            ErrorCategory::Client
        );
        assert_eq!(LlmError::api_error(409, "conflict").status_code(), Some(409));
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        for err in [
            LlmError::ConfigurationError("missing compartment".into()),
            LlmError::InvalidParameter("temperature".into()),
            LlmError::AuthenticationError("bad key".into()),
            LlmError::Cancelled,
        ] {
            assert!(!err.is_retryable(), "{err:?}");
        }
    }
}
