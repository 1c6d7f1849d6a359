//! # siumai-provider-oci
//!
//! Oracle Cloud Infrastructure Generative AI chat provider.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Generic chat**: ordered, role-tagged text messages mapped to OCI's
//!   `GENERIC` chat format, one request per call, no hidden retries.
//! - **Request signing**: OCI HTTP Signatures with API keys, session tokens
//!   or `~/.oci/config` profiles.
//! - **Lazy connection**: building a client is pure; credentials are loaded
//!   on first use or by an explicit `connect().await`.
//! - **Classified errors**: configuration, authentication, response and
//!   transport failures are distinct [`LlmError`] variants.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use siumai_provider_oci::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OciBuilder::new()
//!         .compartment_id("ocid1.compartment.oc1..aaaa")
//!         .region(OciRegion::UsChicago1)
//!         .temperature(0.3)
//!         .build()?;
//!
//!     let response = client
//!         .chat(vec![system!("You are terse."), user!("Hello, world!")])
//!         .await?;
//!     println!("{} ({})", response.text, response.model_version);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod macros;
pub mod providers;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::LlmError;

/// Commonly used items.
pub mod prelude {
    pub use crate::auth::{AuthSource, OciAuthProvider};
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::providers::oci::{
        OciBuilder, OciClient, OciConfig, OciCredentials, OciModel, OciParams, OciRegion,
        OciServingMode,
    };
    pub use crate::traits::ChatCapability;
    pub use crate::types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, Usage};
    pub use crate::utils::cancel::CancelHandle;
    pub use crate::{assistant, message, messages, system, user};
}
