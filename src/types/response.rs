//! Chat response types

use serde::{Deserialize, Serialize};

/// Token usage.
///
/// OCI's generic chat result does not report token counts, so every counter
/// is zero for responses produced by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub const fn zero() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
        }
    }
}

/// Chat response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text
    pub text: String,
    /// Model version reported by the service, `"unknown"` when absent
    pub model_version: String,
    pub usage: Usage,
    /// Model (or dedicated endpoint) the request was served by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// `opc-request-id` echoed by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ChatResponse {
    pub fn content_text(&self) -> &str {
        &self.text
    }
}
