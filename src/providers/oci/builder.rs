//! `OCI` Builder Implementation
//!
//! ```rust,ignore
//! use siumai_provider_oci::prelude::*;
//!
//! let client = OciBuilder::new()
//!     .compartment_id("ocid1.compartment.oc1..aaaa")
//!     .region(OciRegion::UsChicago1)
//!     .model(OciModel::CohereCommandRPlus)
//!     .temperature(0.2)
//!     .build()?;
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::client::OciClient;
use super::config::{OciConfig, OciCredentials, OciParams, OciRegion};
use super::types::OciServingMode;
use crate::auth::{AuthSource, OciAuthProvider};
use crate::error::LlmError;
use crate::types::HttpConfig;

/// `OCI` client builder.
#[derive(Debug, Clone, Default)]
pub struct OciBuilder {
    compartment_id: Option<SecretString>,
    region: Option<String>,
    serving_mode: Option<OciServingMode>,
    params: OciParams,
    auth: AuthSource,
    base_url: Option<String>,
    http_config: HttpConfig,
    http_client: Option<reqwest::Client>,
}

impl OciBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: OciConfig) -> Self {
        Self {
            compartment_id: Some(SecretString::from(
                config.credentials.compartment_id().to_string(),
            )),
            region: Some(config.credentials.region().to_string()),
            serving_mode: Some(config.serving_mode),
            params: config.params,
            auth: config.auth,
            base_url: config.base_url,
            http_config: config.http_config,
            http_client: None,
        }
    }

    pub fn compartment_id<S: Into<String>>(mut self, compartment_id: S) -> Self {
        self.compartment_id = Some(SecretString::from(compartment_id.into()));
        self
    }

    /// Region id, e.g. `"us-chicago-1"` or an [`OciRegion`]. Checked in
    /// [`OciBuilder::build`].
    pub fn region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    /// On-demand model OCID, or an [`super::OciModel`].
    pub fn model<S: Into<String>>(mut self, model_id: S) -> Self {
        self.serving_mode = Some(OciServingMode::on_demand(model_id));
        self
    }

    /// Serve through a dedicated AI cluster endpoint.
    pub fn dedicated_endpoint<S: Into<String>>(mut self, endpoint_id: S) -> Self {
        self.serving_mode = Some(OciServingMode::dedicated(endpoint_id));
        self
    }

    pub fn params(mut self, params: OciParams) -> Self {
        self.params = params;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.params.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.params.max_tokens = max_tokens;
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.params.top_p = top_p;
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.params.top_k = top_k;
        self
    }

    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.params.frequency_penalty = penalty;
        self
    }

    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.params.presence_penalty = penalty;
        self
    }

    /// Sign with a profile from an OCI CLI config file.
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P, profile: Option<String>) -> Self {
        self.auth = AuthSource::config_file(Some(path.into()), profile);
        self
    }

    /// Sign with a profile from `~/.oci/config`.
    pub fn profile<S: Into<String>>(mut self, profile: S) -> Self {
        self.auth = AuthSource::config_file(None, Some(profile.into()));
        self
    }

    /// Sign with an API key.
    pub fn api_key<T, U, F>(
        mut self,
        tenancy: T,
        user: U,
        fingerprint: F,
        private_key_pem: SecretString,
    ) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        F: Into<String>,
    {
        self.auth = AuthSource::ApiKey {
            tenancy: tenancy.into(),
            user: user.into(),
            fingerprint: fingerprint.into(),
            private_key: private_key_pem,
        };
        self
    }

    /// Sign with a session token.
    pub fn session_token(mut self, token: SecretString, private_key_pem: SecretString) -> Self {
        self.auth = AuthSource::SessionToken {
            token,
            private_key: private_key_pem,
        };
        self
    }

    /// Sign as the compute instance through instance principals.
    pub fn instance_principal(mut self) -> Self {
        self.auth = AuthSource::instance_principal();
        self
    }

    pub fn auth_provider(mut self, provider: Arc<dyn OciAuthProvider>) -> Self {
        self.auth = AuthSource::Provider(provider);
        self
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = Some(timeout);
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.http_config.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Assemble the configuration without creating a client.
    pub fn into_config(self) -> Result<OciConfig, LlmError> {
        let region = match self.region.as_deref() {
            Some(region) => region.parse()?,
            None => OciRegion::default(),
        };
        let compartment_id = self
            .compartment_id
            .as_ref()
            .map(|id| id.expose_secret().to_string())
            .unwrap_or_default();
        let credentials = OciCredentials::new(compartment_id, region)?;
        let mut config = OciConfig::new(credentials)
            .with_params(self.params)
            .with_auth(self.auth)
            .with_http_config(self.http_config);
        if let Some(serving_mode) = self.serving_mode {
            config = config.with_serving_mode(serving_mode);
        }
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the client. Does not connect.
    pub fn build(self) -> Result<OciClient, LlmError> {
        let http_client = self.http_client.clone();
        let client = OciClient::new(self.into_config()?)?;
        Ok(match http_client {
            Some(http) => client.with_http_client(http),
            None => client,
        })
    }
}
