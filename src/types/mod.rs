//! Provider-agnostic types

pub mod chat;
pub mod http;
pub mod response;

pub use chat::{ChatMessage, ChatRequest, MessageRole};
pub use http::{HttpConfig, HttpConfigBuilder};
pub use response::{ChatResponse, Usage};
