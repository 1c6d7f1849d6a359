//! API signing key authentication.
//!
//! The classic OCI credential: a user's RSA key pair registered in IAM,
//! identified by `<tenancy-ocid>/<user-ocid>/<key-fingerprint>`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

use super::OciAuthProvider;
use super::signer::RequestSigner;
use crate::error::LlmError;

/// Signs requests with a user API key.
#[derive(Debug)]
pub struct ApiKeyAuthProvider {
    tenancy: String,
    user: String,
    fingerprint: String,
    signer: RequestSigner,
}

impl ApiKeyAuthProvider {
    pub fn new(
        tenancy: impl Into<String>,
        user: impl Into<String>,
        fingerprint: impl Into<String>,
        private_key_pem: &SecretString,
    ) -> Result<Self, LlmError> {
        let tenancy = tenancy.into();
        let user = user.into();
        let fingerprint = fingerprint.into();
        for (field, value) in [
            ("tenancy", &tenancy),
            ("user", &user),
            ("fingerprint", &fingerprint),
        ] {
            if value.trim().is_empty() {
                return Err(LlmError::AuthenticationError(format!(
                    "API key authentication requires a non-empty {field}"
                )));
            }
        }
        let key_id = format!("{tenancy}/{user}/{fingerprint}");
        let signer = RequestSigner::new(key_id, private_key_pem.expose_secret())?;
        Ok(Self {
            tenancy,
            user,
            fingerprint,
            signer,
        })
    }

    /// Load the private key from a PEM file.
    pub async fn from_key_file(
        tenancy: impl Into<String>,
        user: impl Into<String>,
        fingerprint: impl Into<String>,
        key_file: &Path,
    ) -> Result<Self, LlmError> {
        let pem = super::read_secret_file(key_file, "private key").await?;
        Self::new(tenancy, user, fingerprint, &pem)
    }

    pub fn tenancy(&self) -> &str {
        &self.tenancy
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn key_id(&self) -> &str {
        self.signer.key_id()
    }
}

#[async_trait]
impl OciAuthProvider for ApiKeyAuthProvider {
    fn name(&self) -> &'static str {
        "api_key"
    }

    async fn sign_request(&self, request: &mut reqwest::Request) -> Result<(), LlmError> {
        self.signer.sign(request)
    }
}
