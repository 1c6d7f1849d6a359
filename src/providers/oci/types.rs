//! OCI Generative AI wire types
//!
//! Request and response bodies of `POST /20231130/actions/chat` in the
//! `GENERIC` API format.

use serde::{Deserialize, Serialize};

/// Vendor role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OciRole {
    System,
    User,
    Assistant,
}

/// A content block. Only text is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OciContent {
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OciMessage {
    pub role: OciRole,
    pub content: Vec<OciContent>,
}

/// How the model is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "servingType")]
pub enum OciServingMode {
    /// Shared pretrained model, addressed by model OCID.
    #[serde(rename = "ON_DEMAND", rename_all = "camelCase")]
    OnDemand { model_id: String },
    /// Dedicated AI cluster endpoint, addressed by endpoint OCID.
    #[serde(rename = "DEDICATED", rename_all = "camelCase")]
    Dedicated { endpoint_id: String },
}

impl OciServingMode {
    pub fn on_demand(model_id: impl Into<String>) -> Self {
        Self::OnDemand {
            model_id: model_id.into(),
        }
    }

    pub fn dedicated(endpoint_id: impl Into<String>) -> Self {
        Self::Dedicated {
            endpoint_id: endpoint_id.into(),
        }
    }

    /// The model or endpoint OCID.
    pub fn target_id(&self) -> &str {
        match self {
            Self::OnDemand { model_id } => model_id,
            Self::Dedicated { endpoint_id } => endpoint_id,
        }
    }
}

impl Default for OciServingMode {
    fn default() -> Self {
        Self::on_demand(super::models::DEFAULT_MODEL_ID)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OciApiFormat {
    #[serde(rename = "GENERIC")]
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciGenericChatRequest {
    pub api_format: OciApiFormat,
    pub messages: Vec<OciMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub top_k: u32,
    pub top_p: f64,
}

/// Body of the chat action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciChatDetails {
    pub compartment_id: String,
    pub serving_mode: OciServingMode,
    pub chat_request: OciGenericChatRequest,
}

/// Response envelope. Every level is optional so that a partial body is
/// reported as a malformed response rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciChatResponseEnvelope {
    #[serde(default)]
    pub chat_response: Option<OciChatResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciChatResponse {
    #[serde(default)]
    pub chat_result: Option<OciChatResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OciChatResult {
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub model_version: Option<serde_json::Value>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OciErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
