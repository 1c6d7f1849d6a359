//! OCI Generative AI configuration
//!
//! Credentials, generation options and client settings. Everything here is
//! plain data: building an [`OciConfig`] never touches the network or the
//! filesystem.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

use super::credentials::{CredentialDescriptor, CredentialField, FieldKind, FieldOption};
use super::models::DEFAULT_MODEL_ID;
use super::types::OciServingMode;
use crate::auth::AuthSource;
use crate::error::LlmError;
use crate::types::HttpConfig;

/// Domain of the OC1 realm.
pub const OCI_CLOUD_DOMAIN: &str = "oci.oraclecloud.com";

/// Version prefix of the inference API.
pub const API_VERSION: &str = "20231130";

pub const ENV_COMPARTMENT_ID: &str = "OCI_COMPARTMENT_ID";
pub const ENV_REGION: &str = "OCI_REGION";
pub const ENV_MODEL_ID: &str = "OCI_GENAI_MODEL_ID";
pub const ENV_CONFIG_FILE: &str = "OCI_CLI_CONFIG_FILE";
pub const ENV_PROFILE: &str = "OCI_CLI_PROFILE";
pub const ENV_AUTH: &str = "OCI_CLI_AUTH";

/// Regions where Generative AI inference is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OciRegion {
    #[default]
    UsAshburn1,
    UsChicago1,
    UkLondon1,
    EuFrankfurt1,
}

impl OciRegion {
    pub const ALL: [Self; 4] = [
        Self::UsAshburn1,
        Self::UsChicago1,
        Self::UkLondon1,
        Self::EuFrankfurt1,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsAshburn1 => "us-ashburn-1",
            Self::UsChicago1 => "us-chicago-1",
            Self::UkLondon1 => "uk-london-1",
            Self::EuFrankfurt1 => "eu-frankfurt-1",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::UsAshburn1 => "US Ashburn (us-ashburn-1)",
            Self::UsChicago1 => "US Chicago (us-chicago-1)",
            Self::UkLondon1 => "UK London (uk-london-1)",
            Self::EuFrankfurt1 => "Frankfurt (eu-frankfurt-1)",
        }
    }

    /// `https://inference.generativeai.<region>.oci.oraclecloud.com`
    pub fn inference_endpoint(self) -> String {
        format!(
            "https://inference.generativeai.{}.{OCI_CLOUD_DOMAIN}",
            self.as_str()
        )
    }
}

impl fmt::Display for OciRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OciRegion {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                LlmError::ConfigurationError(format!(
                    "Unsupported OCI region '{s}'; expected one of {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

impl TryFrom<String> for OciRegion {
    type Error = LlmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OciRegion> for String {
    fn from(region: OciRegion) -> Self {
        region.as_str().to_string()
    }
}

/// Compartment and region the client operates in.
#[derive(Clone)]
pub struct OciCredentials {
    compartment_id: SecretString,
    region: OciRegion,
}

impl fmt::Debug for OciCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciCredentials")
            .field("compartment_id", &"[REDACTED]")
            .field("region", &self.region)
            .finish()
    }
}

impl OciCredentials {
    pub fn new(compartment_id: impl Into<String>, region: OciRegion) -> Result<Self, LlmError> {
        let compartment_id = compartment_id.into();
        if compartment_id.trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "compartmentId is required".to_string(),
            ));
        }
        Ok(Self {
            compartment_id: SecretString::from(compartment_id.trim().to_string()),
            region,
        })
    }

    pub fn compartment_id(&self) -> &str {
        self.compartment_id.expose_secret()
    }

    pub const fn region(&self) -> OciRegion {
        self.region
    }

    /// The `ociApi` credential form.
    pub fn descriptor() -> CredentialDescriptor {
        CredentialDescriptor {
            name: "ociApi",
            display_name: "Oracle Cloud Infrastructure API",
            documentation_url: "oci",
            properties: vec![
                CredentialField {
                    name: "compartmentId",
                    display_name: "Compartment ID",
                    kind: FieldKind::String,
                    secret: true,
                    required: true,
                    default: "",
                    description: "OCI compartment OCID where the Generative AI service is available",
                    options: Vec::new(),
                },
                CredentialField {
                    name: "region",
                    display_name: "Region",
                    kind: FieldKind::Options,
                    secret: false,
                    required: true,
                    default: OciRegion::default().as_str(),
                    description: "OCI region where the Generative AI service is available",
                    options: OciRegion::ALL
                        .into_iter()
                        .map(|r| FieldOption {
                            name: r.display_name(),
                            value: r.as_str(),
                        })
                        .collect(),
                },
            ],
        }
    }

    /// Read credentials submitted through the descriptor's form, e.g.
    /// `{"compartmentId": "ocid1.compartment...", "region": "uk-london-1"}`.
    /// A missing region falls back to the field default.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, LlmError> {
        let compartment_id = value
            .get("compartmentId")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        let region = match value.get("region") {
            None | Some(serde_json::Value::Null) => OciRegion::default(),
            Some(serde_json::Value::String(s)) => s.parse()?,
            Some(other) => {
                return Err(LlmError::ConfigurationError(format!(
                    "region must be a string, got {other}"
                )));
            }
        };
        Self::new(compartment_id, region)
    }
}

/// Generation options.
///
/// Defaults: temperature 0.7, maxTokens 2048, topP 1, topK 0 (no limit),
/// both penalties 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct OciParams {
    #[validate(range(min = 0.0, max = 1.0))]
    pub temperature: f64,
    #[validate(range(min = 1, max = 4096))]
    pub max_tokens: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f64,
    #[validate(range(min = 0, max = 500))]
    pub top_k: u32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub frequency_penalty: f64,
    #[validate(range(min = 0.0, max = 2.0))]
    pub presence_penalty: f64,
}

impl Default for OciParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 1.0,
            top_k: 0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl OciParams {
    /// Check every option against its range. NaN and infinities are
    /// rejected before the range checks, which do not catch NaN.
    pub fn validate_params(&self) -> Result<(), LlmError> {
        for (name, value) in [
            ("temperature", self.temperature),
            ("topP", self.top_p),
            ("frequencyPenalty", self.frequency_penalty),
            ("presencePenalty", self.presence_penalty),
        ] {
            if !value.is_finite() {
                return Err(LlmError::InvalidParameter(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        self.validate()
            .map_err(|e| LlmError::InvalidParameter(e.to_string()))
    }
}

/// Everything an [`super::OciClient`] needs.
#[derive(Debug, Clone)]
pub struct OciConfig {
    pub credentials: OciCredentials,
    pub serving_mode: OciServingMode,
    pub params: OciParams,
    pub auth: AuthSource,
    /// Replaces the regional endpoint (tests, proxies).
    pub base_url: Option<String>,
    pub http_config: HttpConfig,
}

impl OciConfig {
    pub fn new(credentials: OciCredentials) -> Self {
        Self {
            credentials,
            serving_mode: OciServingMode::default(),
            params: OciParams::default(),
            auth: AuthSource::default(),
            base_url: None,
            http_config: HttpConfig::default(),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.serving_mode = OciServingMode::on_demand(model_id);
        self
    }

    pub fn with_serving_mode(mut self, serving_mode: OciServingMode) -> Self {
        self.serving_mode = serving_mode;
        self
    }

    pub fn with_params(mut self, params: OciParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_auth(mut self, auth: AuthSource) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Endpoint requests are sent to, without a trailing slash.
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.credentials.region().inference_endpoint(),
        }
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        self.params.validate_params()?;
        if self.serving_mode.target_id().trim().is_empty() {
            return Err(LlmError::ConfigurationError(
                "Model id (or dedicated endpoint id) must not be empty".to_string(),
            ));
        }
        if let Some(url) = &self.base_url {
            reqwest::Url::parse(url).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid base URL '{url}': {e}"))
            })?;
        }
        Ok(())
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_env_map(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`:
    /// - `OCI_COMPARTMENT_ID` (required)
    /// - `OCI_REGION` (default `us-ashburn-1`)
    /// - `OCI_GENAI_MODEL_ID` (default model otherwise)
    /// - `OCI_CLI_AUTH=instance_principal` to sign as the compute instance,
    ///   otherwise `OCI_CLI_CONFIG_FILE` / `OCI_CLI_PROFILE`
    pub fn from_env_map<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let compartment_id = get(ENV_COMPARTMENT_ID).ok_or_else(|| {
            LlmError::ConfigurationError(format!("{ENV_COMPARTMENT_ID} is not set"))
        })?;
        let region = match get(ENV_REGION) {
            Some(region) => region.parse()?,
            None => OciRegion::default(),
        };
        let model_id = get(ENV_MODEL_ID).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let auth = match get(ENV_AUTH).as_deref().map(str::trim) {
            None | Some("api_key") | Some("security_token") => AuthSource::config_file(
                get(ENV_CONFIG_FILE).map(PathBuf::from),
                get(ENV_PROFILE),
            ),
            Some("instance_principal") => AuthSource::instance_principal(),
            Some(other) => {
                return Err(LlmError::ConfigurationError(format!(
                    "Unsupported {ENV_AUTH} value '{other}'"
                )));
            }
        };

        Ok(Self::new(OciCredentials::new(compartment_id, region)?)
            .with_model(model_id)
            .with_auth(auth))
    }
}
