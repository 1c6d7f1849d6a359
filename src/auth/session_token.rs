//! Session (security) token authentication.
//!
//! Produced by `oci session authenticate`: a short-lived token plus a session
//! key pair. The key id is `ST$<token>`. Refreshing the token is left to the
//! CLI.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

use super::OciAuthProvider;
use super::signer::RequestSigner;
use crate::error::LlmError;

/// Signs requests with a session token and its key.
#[derive(Debug)]
pub struct SessionTokenAuthProvider {
    signer: RequestSigner,
}

impl SessionTokenAuthProvider {
    pub fn new(token: &SecretString, private_key_pem: &SecretString) -> Result<Self, LlmError> {
        let token = token.expose_secret().trim();
        if token.is_empty() {
            return Err(LlmError::AuthenticationError(
                "Session token is empty".to_string(),
            ));
        }
        let signer = RequestSigner::new(format!("ST${token}"), private_key_pem.expose_secret())?;
        Ok(Self { signer })
    }

    /// Load the token and key from the files referenced by an OCI profile
    /// (`security_token_file`, `key_file`).
    pub async fn from_files(token_file: &Path, key_file: &Path) -> Result<Self, LlmError> {
        let token = super::read_secret_file(token_file, "security token").await?;
        let pem = super::read_secret_file(key_file, "private key").await?;
        Self::new(&token, &pem)
    }
}

#[async_trait]
impl OciAuthProvider for SessionTokenAuthProvider {
    fn name(&self) -> &'static str {
        "session_token"
    }

    async fn sign_request(&self, request: &mut reqwest::Request) -> Result<(), LlmError> {
        self.signer.sign(request)
    }
}
