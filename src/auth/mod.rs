//! Authentication and request signing.
//!
//! OCI has no bearer tokens: every request is signed with an RSA key using
//! HTTP Signatures. An [`OciAuthProvider`] owns the key material and signs a
//! fully built request just before it is sent.

use async_trait::async_trait;
use secrecy::SecretString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LlmError;

pub mod api_key;
pub mod config_file;
pub mod instance_principal;
pub mod session_token;
pub mod signer;

pub use api_key::ApiKeyAuthProvider;
pub use config_file::{OciConfigFile, OciProfile};
pub use instance_principal::InstancePrincipalAuthProvider;
pub use session_token::SessionTokenAuthProvider;
pub use signer::RequestSigner;

/// Signs outgoing requests.
///
/// Implementations must be shareable across concurrent requests.
#[async_trait]
pub trait OciAuthProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Add authentication headers to `request`.
    async fn sign_request(&self, request: &mut reqwest::Request) -> Result<(), LlmError>;
}

/// Where signing credentials come from.
#[derive(Clone)]
pub enum AuthSource {
    /// An OCI CLI config file profile. `None` means `~/.oci/config` and
    /// profile `DEFAULT`.
    ConfigFile {
        path: Option<PathBuf>,
        profile: Option<String>,
    },
    /// Explicit API key credentials.
    ApiKey {
        tenancy: String,
        user: String,
        fingerprint: String,
        private_key: SecretString,
    },
    /// A session token and its key.
    SessionToken {
        token: SecretString,
        private_key: SecretString,
    },
    /// The compute instance's identity, federated through the instance
    /// metadata service. `None` URLs use the well-known endpoints.
    InstancePrincipal {
        metadata_base_url: Option<String>,
        federation_endpoint: Option<String>,
    },
    /// A caller supplied provider.
    Provider(Arc<dyn OciAuthProvider>),
}

impl Default for AuthSource {
    fn default() -> Self {
        Self::ConfigFile {
            path: None,
            profile: None,
        }
    }
}

impl fmt::Debug for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigFile { path, profile } => f
                .debug_struct("ConfigFile")
                .field("path", path)
                .field("profile", profile)
                .finish(),
            Self::ApiKey {
                tenancy,
                user,
                fingerprint,
                ..
            } => f
                .debug_struct("ApiKey")
                .field("tenancy", tenancy)
                .field("user", user)
                .field("fingerprint", fingerprint)
                .field("private_key", &"[REDACTED]")
                .finish(),
            Self::SessionToken { .. } => f
                .debug_struct("SessionToken")
                .field("token", &"[REDACTED]")
                .field("private_key", &"[REDACTED]")
                .finish(),
            Self::InstancePrincipal {
                metadata_base_url,
                federation_endpoint,
            } => f
                .debug_struct("InstancePrincipal")
                .field("metadata_base_url", metadata_base_url)
                .field("federation_endpoint", federation_endpoint)
                .finish(),
            Self::Provider(provider) => f.debug_tuple("Provider").field(&provider.name()).finish(),
        }
    }
}

impl AuthSource {
    /// Use a config file profile.
    pub fn config_file(path: Option<PathBuf>, profile: Option<String>) -> Self {
        Self::ConfigFile { path, profile }
    }

    /// Authenticate as the compute instance.
    pub fn instance_principal() -> Self {
        Self::InstancePrincipal {
            metadata_base_url: None,
            federation_endpoint: None,
        }
    }

    /// Build the signing provider. Reads key and config files as needed.
    pub async fn resolve(&self) -> Result<Arc<dyn OciAuthProvider>, LlmError> {
        match self {
            Self::ConfigFile { path, profile } => {
                let path = path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(config_file::DEFAULT_CONFIG_FILE));
                let profile = profile.as_deref().unwrap_or(config_file::DEFAULT_PROFILE);
                let file = OciConfigFile::load(&path).await?;
                file.profile(profile)?.auth_provider().await
            }
            Self::ApiKey {
                tenancy,
                user,
                fingerprint,
                private_key,
            } => Ok(Arc::new(ApiKeyAuthProvider::new(
                tenancy.as_str(),
                user.as_str(),
                fingerprint.as_str(),
                private_key,
            )?)),
            Self::SessionToken { token, private_key } => Ok(Arc::new(
                SessionTokenAuthProvider::new(token, private_key)?,
            )),
            Self::InstancePrincipal {
                metadata_base_url,
                federation_endpoint,
            } => {
                let mut provider = InstancePrincipalAuthProvider::default_client()?;
                if let Some(url) = metadata_base_url {
                    provider = provider.with_metadata_base_url(url.as_str());
                }
                if let Some(url) = federation_endpoint {
                    provider = provider.with_federation_endpoint(url.as_str());
                }
                // Federate now so a missing metadata service fails connect().
                provider.session_key_id().await?;
                Ok(Arc::new(provider))
            }
            Self::Provider(provider) => Ok(provider.clone()),
        }
    }
}

/// Read a credential file into a secret.
pub(crate) async fn read_secret_file(path: &Path, what: &str) -> Result<SecretString, LlmError> {
    let path = config_file::expand_home(path);
    tokio::fs::read_to_string(&path)
        .await
        .map(SecretString::from)
        .map_err(|e| {
            LlmError::AuthenticationError(format!(
                "Failed to read {what} file {}: {e}",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_KEY: &str = include_str!("../../tests/fixtures/oci_test_key.pem");

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn config_file_profile_resolves_api_key_provider() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "key.pem", TEST_KEY);
        let config = write_file(
            dir.path(),
            "config",
            "[DEFAULT]\nuser=ocid1.user.oc1..u\nfingerprint=aa:bb\ntenancy=ocid1.tenancy.oc1..t\nkey_file=key.pem\n",
        );

        let provider = AuthSource::config_file(Some(config), None)
            .resolve()
            .await
            .unwrap();
        assert_eq!(provider.name(), "api_key");
    }

    #[tokio::test]
    async fn security_token_file_selects_session_auth() {
        let dir = tempfile::tempdir().unwrap();
        let key = write_file(dir.path(), "session.pem", TEST_KEY);
        let token = write_file(dir.path(), "token", "tok-abc\n");
        let config = write_file(
            dir.path(),
            "config",
            &format!(
                "[DEFAULT]\nregion=us-ashburn-1\n\n[SESSION]\nsecurity_token_file={}\nkey_file={}\n",
                token.display(),
                key.display()
            ),
        );

        let provider = AuthSource::config_file(Some(config), Some("SESSION".to_string()))
            .resolve()
            .await
            .unwrap();
        assert_eq!(provider.name(), "session_token");
    }

    #[tokio::test]
    async fn missing_config_file_is_an_authentication_error() {
        let result = AuthSource::config_file(Some(PathBuf::from("/nope/oci/config")), None)
            .resolve()
            .await;
        let Err(err) = result else {
            panic!("missing config file should not resolve");
        };
        assert!(matches!(err, LlmError::AuthenticationError(_)));
    }

    #[tokio::test]
    async fn instance_principal_without_metadata_service_is_an_authentication_error() {
        let server = wiremock::MockServer::start().await;
        let source = AuthSource::InstancePrincipal {
            metadata_base_url: Some(format!("{}/opc/v2", server.uri())),
            federation_endpoint: Some(format!("{}/v1/x509", server.uri())),
        };
        let Err(err) = source.resolve().await else {
            panic!("instance principal should not resolve without a metadata service");
        };
        assert!(matches!(err, LlmError::AuthenticationError(ref m) if m.contains("metadata")));
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let source = AuthSource::ApiKey {
            tenancy: "t".to_string(),
            user: "u".to_string(),
            fingerprint: "f".to_string(),
            private_key: SecretString::from(TEST_KEY.to_string()),
        };
        let debug = format!("{source:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("PRIVATE KEY"));
    }
}
