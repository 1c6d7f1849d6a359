//! Transformers for OCI Generative AI chat
//!
//! Request side: generic messages and options into [`OciChatDetails`].
//! Response side: the chat result envelope into a [`ChatResponse`].

use secrecy::{ExposeSecret, SecretString};

use super::config::OciParams;
use super::types::{
    OciApiFormat, OciChatDetails, OciChatResponseEnvelope, OciContent, OciGenericChatRequest,
    OciMessage, OciRole, OciServingMode,
};
use crate::error::LlmError;
use crate::types::{ChatMessage, ChatResponse, MessageRole, Usage};

/// Model version reported when the service omits one.
pub const UNKNOWN_MODEL_VERSION: &str = "unknown";

/// Map a generic role to the vendor's role tag. Roles the vendor has no tag
/// for are sent as `USER`.
pub fn map_role(role: &MessageRole) -> OciRole {
    match role {
        MessageRole::System => OciRole::System,
        MessageRole::User => OciRole::User,
        MessageRole::Assistant => OciRole::Assistant,
        MessageRole::Developer | MessageRole::Tool | MessageRole::Other(_) => {
            tracing::warn!(role = %role, "No OCI role for message role, sending as USER");
            OciRole::User
        }
    }
}

pub fn convert_message(message: &ChatMessage) -> OciMessage {
    OciMessage {
        role: map_role(&message.role),
        content: vec![OciContent::Text {
            text: message.content.clone(),
        }],
    }
}

/// Convert messages, preserving order.
pub fn convert_messages(messages: &[ChatMessage]) -> Vec<OciMessage> {
    messages.iter().map(convert_message).collect()
}

/// Builds chat action bodies for one compartment and serving mode.
#[derive(Debug, Clone)]
pub struct OciRequestTransformer {
    compartment_id: SecretString,
    serving_mode: OciServingMode,
}

impl OciRequestTransformer {
    pub fn new(compartment_id: impl Into<String>, serving_mode: OciServingMode) -> Self {
        Self {
            compartment_id: SecretString::from(compartment_id.into()),
            serving_mode,
        }
    }

    pub fn transform_chat(
        &self,
        messages: &[ChatMessage],
        params: &OciParams,
    ) -> Result<OciChatDetails, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::InvalidInput(
                "At least one message is required".to_string(),
            ));
        }

        Ok(OciChatDetails {
            compartment_id: self.compartment_id.expose_secret().to_string(),
            serving_mode: self.serving_mode.clone(),
            chat_request: OciGenericChatRequest {
                api_format: OciApiFormat::Generic,
                messages: convert_messages(messages),
                max_tokens: params.max_tokens,
                temperature: params.temperature,
                frequency_penalty: params.frequency_penalty,
                presence_penalty: params.presence_penalty,
                top_k: params.top_k,
                top_p: params.top_p,
            },
        })
    }
}

/// A textual or numeric `modelVersion`; anything else is reported as
/// [`UNKNOWN_MODEL_VERSION`].
fn model_version(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(v)) if !v.is_empty() => v,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_MODEL_VERSION.to_string(),
    }
}

/// Parses chat action responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct OciResponseTransformer;

impl OciResponseTransformer {
    /// Extract `chatResponse.chatResult.{response, modelVersion}`.
    ///
    /// - blank or `null` body: [`LlmError::EmptyResponse`]
    /// - body that is not JSON: [`LlmError::ParseError`]
    /// - missing, empty or non-text `response`: [`LlmError::MalformedResponse`]
    pub fn transform_chat_response(&self, body: &str) -> Result<ChatResponse, LlmError> {
        if body.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| LlmError::ParseError(format!("Invalid chat response JSON: {e}")))?;
        if value.is_null() {
            return Err(LlmError::EmptyResponse);
        }

        let envelope: OciChatResponseEnvelope =
            serde_json::from_value(value).map_err(|_| LlmError::MalformedResponse)?;
        let result = envelope
            .chat_response
            .and_then(|r| r.chat_result)
            .ok_or(LlmError::MalformedResponse)?;

        let text = match result.response {
            Some(serde_json::Value::String(text)) if !text.is_empty() => text,
            _ => return Err(LlmError::MalformedResponse),
        };

        Ok(ChatResponse {
            text,
            model_version: model_version(result.model_version),
            usage: Usage::zero(),
            model_id: None,
            request_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn transformer() -> OciRequestTransformer {
        OciRequestTransformer::new(
            "ocid1.compartment.oc1..c",
            OciServingMode::on_demand("ocid1.generativeaimodel.m"),
        )
    }

    #[test]
    fn builds_generic_chat_details() {
        let details = transformer()
            .transform_chat(
                &[ChatMessage::system("Be brief."), ChatMessage::user("Hi")],
                &OciParams::default(),
            )
            .unwrap();

        assert_eq!(
            serde_json::to_value(details).unwrap(),
            json!({
                "compartmentId": "ocid1.compartment.oc1..c",
                "servingMode": {"servingType": "ON_DEMAND", "modelId": "ocid1.generativeaimodel.m"},
                "chatRequest": {
                    "apiFormat": "GENERIC",
                    "messages": [
                        {"role": "SYSTEM", "content": [{"type": "TEXT", "text": "Be brief."}]},
                        {"role": "USER", "content": [{"type": "TEXT", "text": "Hi"}]}
                    ],
                    "maxTokens": 2048,
                    "temperature": 0.7,
                    "frequencyPenalty": 0.0,
                    "presencePenalty": 0.0,
                    "topK": 0,
                    "topP": 1.0
                }
            })
        );
    }

    #[test]
    fn debug_output_redacts_compartment_id() {
        let debug = format!("{:?}", transformer());
        assert!(!debug.contains("ocid1.compartment"), "{debug}");
        assert!(debug.contains("OnDemand"), "{debug}");
    }

    #[test]
    fn empty_conversation_is_invalid_input() {
        let err = transformer()
            .transform_chat(&[], &OciParams::default())
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[traced_test]
    #[test]
    fn unknown_roles_fall_back_to_user_with_warning() {
        assert_eq!(map_role(&MessageRole::Tool), OciRole::User);
        assert_eq!(
            map_role(&MessageRole::Other("function".to_string())),
            OciRole::User
        );
        assert!(logs_contain("sending as USER"));
    }

    #[test]
    fn known_roles_map_directly() {
        assert_eq!(map_role(&MessageRole::System), OciRole::System);
        assert_eq!(map_role(&MessageRole::User), OciRole::User);
        assert_eq!(map_role(&MessageRole::Assistant), OciRole::Assistant);
    }

    #[test]
    fn parses_response_and_defaults_model_version() {
        let parsed = OciResponseTransformer
            .transform_chat_response(r#"{"chatResponse":{"chatResult":{"response":"Hello"}}}"#)
            .unwrap();
        assert_eq!(parsed.text, "Hello");
        assert_eq!(parsed.model_version, "unknown");
        assert_eq!(parsed.usage, Usage::zero());

        let parsed = OciResponseTransformer
            .transform_chat_response(
                r#"{"chatResponse":{"chatResult":{"response":"Hi","modelVersion":"3.1"}}}"#,
            )
            .unwrap();
        assert_eq!(parsed.model_version, "3.1");
    }

    #[test]
    fn non_string_model_version_does_not_reject_the_response() {
        let t = OciResponseTransformer;
        let parsed = t
            .transform_chat_response(
                r#"{"chatResponse":{"chatResult":{"response":"hello","modelVersion":1}}}"#,
            )
            .unwrap();
        assert_eq!(parsed.text, "hello");
        assert_eq!(parsed.model_version, "1");

        for version in ["null", "\"\"", "{\"v\":1}", "[1]", "true"] {
            let body = format!(
                r#"{{"chatResponse":{{"chatResult":{{"response":"hello","modelVersion":{version}}}}}}}"#
            );
            let parsed = t.transform_chat_response(&body).unwrap();
            assert_eq!(parsed.model_version, UNKNOWN_MODEL_VERSION, "{version}");
        }
    }

    #[test]
    fn response_failure_kinds() {
        let t = OciResponseTransformer;
        assert!(matches!(t.transform_chat_response(""), Err(LlmError::EmptyResponse)));
        assert!(matches!(t.transform_chat_response("null"), Err(LlmError::EmptyResponse)));
        assert!(matches!(t.transform_chat_response("{oops"), Err(LlmError::ParseError(_))));
        for body in [
            r#"{}"#,
            r#"{"chatResponse":{}}"#,
            r#"{"chatResponse":{"chatResult":{}}}"#,
            r#"{"chatResponse":{"chatResult":{"response":""}}}"#,
            r#"{"chatResponse":{"chatResult":{"response":{"nested":true}}}}"#,
            r#"[1,2]"#,
        ] {
            assert!(
                matches!(t.transform_chat_response(body), Err(LlmError::MalformedResponse)),
                "{body}"
            );
        }
    }

    fn role_strategy() -> impl Strategy<Value = MessageRole> {
        prop_oneof![
            Just(MessageRole::System),
            Just(MessageRole::User),
            Just(MessageRole::Assistant),
            "[a-z]{1,8}".prop_map(|s: String| MessageRole::from(s)),
        ]
    }

    proptest! {
        #[test]
        fn conversion_preserves_order_and_text(
            messages in prop::collection::vec((role_strategy(), ".{0,40}"), 1..16)
        ) {
            let input: Vec<ChatMessage> = messages
                .into_iter()
                .map(|(role, text)| ChatMessage::new(role, text))
                .collect();
            let converted = convert_messages(&input);
            prop_assert_eq!(converted.len(), input.len());
            for (src, out) in input.iter().zip(&converted) {
                prop_assert_eq!(out.role, map_role(&src.role));
                prop_assert_eq!(
                    &out.content,
                    &vec![OciContent::Text { text: src.content.clone() }]
                );
            }
        }
    }
}
