//! Oracle Cloud Infrastructure Generative AI
//!
//! Chat inference through `POST /20231130/actions/chat` using the `GENERIC`
//! API format. Requests are signed with OCI HTTP Signatures (see
//! [`crate::auth`]).

pub mod builder;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod models;
pub mod transformers;
pub mod types;

pub use builder::OciBuilder;
pub use client::{IdentifyingParams, LLM_TYPE, OciClient, OciConnection};
pub use config::{OciConfig, OciCredentials, OciParams, OciRegion};
pub use credentials::{CredentialDescriptor, CredentialField, FieldKind, FieldOption};
pub use models::{DEFAULT_MODEL_ID, OciModel, get_all_models, model_ids};
pub use types::OciServingMode;
