//! Chat capability trait

use async_trait::async_trait;

use crate::error::LlmError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::utils::cancel::{CancelHandle, run_cancellable};

#[async_trait]
pub trait ChatCapability: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        self.chat_request(ChatRequest::new(messages)).await
    }

    /// Full chat request: messages plus optional per-call options and deadline.
    async fn chat_request(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Like [`ChatCapability::chat_request`], but resolves to
    /// [`LlmError::Cancelled`] as soon as `cancel` fires. The in-flight HTTP
    /// request is dropped.
    async fn chat_request_with_cancel(
        &self,
        request: ChatRequest,
        cancel: &CancelHandle,
    ) -> Result<ChatResponse, LlmError> {
        run_cancellable(cancel, self.chat_request(request)).await
    }

    async fn ask(&self, prompt: String) -> Result<String, LlmError> {
        let response = self.chat(vec![ChatMessage::user(prompt)]).await?;
        Ok(response.text)
    }

    async fn ask_with_system(
        &self,
        system_prompt: String,
        user_prompt: String,
    ) -> Result<String, LlmError> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];
        let response = self.chat(messages).await?;
        Ok(response.text)
    }
}
