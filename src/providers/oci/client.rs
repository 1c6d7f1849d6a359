//! OCI Generative AI Client Implementation
//!
//! `OciClient::new` only validates and stores configuration. The signing
//! provider and HTTP client are built on first use (or by an explicit
//! [`OciClient::connect`]) exactly once, even under concurrent callers.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::config::{API_VERSION, OciConfig, OciParams};
use super::errors::{OPC_REQUEST_ID, classify_oci_http_error};
use super::transformers::{OciRequestTransformer, OciResponseTransformer};
use super::types::OciServingMode;
use crate::auth::OciAuthProvider;
use crate::error::LlmError;
use crate::traits::ChatCapability;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::utils::cancel::run_with_timeout;
use crate::utils::http_client::build_http_client_from_config;

/// Name reported by [`OciClient::llm_type`].
pub const LLM_TYPE: &str = "oci-chat";

/// Authenticated transport, built once per client.
pub struct OciConnection {
    http: reqwest::Client,
    auth: Arc<dyn OciAuthProvider>,
    endpoint: String,
}

impl std::fmt::Debug for OciConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciConnection")
            .field("auth", &self.auth.name())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Parameters that identify a configured model instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyingParams {
    pub compartment_id: String,
    pub model_id: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

/// OCI Generative AI chat client
pub struct OciClient {
    config: OciConfig,
    endpoint: String,
    request_transformer: OciRequestTransformer,
    http_client: Option<reqwest::Client>,
    connection: OnceCell<OciConnection>,
}

impl std::fmt::Debug for OciClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciClient")
            .field("provider_name", &"oci")
            .field("endpoint", &self.endpoint)
            .field("serving_mode", &self.config.serving_mode)
            .field("params", &self.config.params)
            .field("auth", &self.config.auth)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl OciClient {
    /// Validate `config` and create a client. Performs no I/O.
    pub fn new(config: OciConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let endpoint = config.endpoint();
        let request_transformer = OciRequestTransformer::new(
            config.credentials.compartment_id(),
            config.serving_mode.clone(),
        );
        Ok(Self {
            config,
            endpoint,
            request_transformer,
            http_client: None,
            connection: OnceCell::new(),
        })
    }

    /// Use a caller supplied HTTP client instead of one built from
    /// [`OciConfig::http_config`].
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn config(&self) -> &OciConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn serving_mode(&self) -> &OciServingMode {
        &self.config.serving_mode
    }

    pub const fn params(&self) -> &OciParams {
        &self.config.params
    }

    pub const fn llm_type(&self) -> &'static str {
        LLM_TYPE
    }

    pub fn identifying_params(&self) -> IdentifyingParams {
        let params = &self.config.params;
        IdentifyingParams {
            compartment_id: self.config.credentials.compartment_id().to_string(),
            model_id: self.config.serving_mode.target_id().to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            top_k: params.top_k,
        }
    }

    /// Whether the authenticated transport has been built.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Build the signing provider and HTTP client. Idempotent.
    pub async fn connect(&self) -> Result<(), LlmError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<&OciConnection, LlmError> {
        self.connection
            .get_or_try_init(|| async {
                let auth = self.config.auth.resolve().await?;
                let http = match &self.http_client {
                    Some(client) => client.clone(),
                    None => build_http_client_from_config(&self.config.http_config)?,
                };
                info!(
                    endpoint = %self.endpoint,
                    auth = auth.name(),
                    region = %self.config.credentials.region(),
                    "OCI Generative AI client connected"
                );
                Ok::<_, LlmError>(OciConnection {
                    http,
                    auth,
                    endpoint: self.endpoint.clone(),
                })
            })
            .await
    }

    /// Send `messages` with the client's options, or with `params` when given.
    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        params: Option<&OciParams>,
    ) -> Result<ChatResponse, LlmError> {
        let params = match params {
            Some(params) => {
                params.validate_params()?;
                params
            }
            None => &self.config.params,
        };
        let details = self.request_transformer.transform_chat(messages, params)?;
        let body = serde_json::to_vec(&details)?;

        let connection = self.connection().await?;
        let url = format!("{}/{API_VERSION}/actions/chat", connection.endpoint);
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut request = connection
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(OPC_REQUEST_ID, &request_id)
            .body(body)
            .build()?;
        connection.auth.sign_request(&mut request).await?;

        debug!(
            url = %url,
            request_id = %request_id,
            model = %self.config.serving_mode.target_id(),
            messages = messages.len(),
            "Sending OCI chat request"
        );

        let response = connection.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if !status.is_success() {
            let err = classify_oci_http_error(status.as_u16(), &text, &headers);
            debug!(status = status.as_u16(), error = %err, "OCI chat request failed");
            return Err(err);
        }

        let mut chat = OciResponseTransformer.transform_chat_response(&text)?;
        chat.model_id = Some(self.config.serving_mode.target_id().to_string());
        chat.request_id = headers
            .get(OPC_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(chat)
    }
}

#[async_trait]
impl ChatCapability for OciClient {
    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        run_with_timeout(
            request.timeout,
            self.generate(&request.messages, request.params.as_ref()),
        )
        .await
    }
}
