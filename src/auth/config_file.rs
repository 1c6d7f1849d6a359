//! OCI CLI/SDK configuration file support.
//!
//! The file is INI-like:
//!
//! ```text
//! [DEFAULT]
//! user=ocid1.user.oc1..aaaa
//! fingerprint=20:3b:97:13:...
//! key_file=~/.oci/oci_api_key.pem
//! tenancy=ocid1.tenancy.oc1..aaaa
//! region=us-ashburn-1
//!
//! [SESSION]
//! security_token_file=~/.oci/sessions/SESSION/token
//! key_file=~/.oci/sessions/SESSION/oci_api_key.pem
//! ```
//!
//! Keys in `[DEFAULT]` are inherited by every other profile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::OciAuthProvider;
use super::api_key::ApiKeyAuthProvider;
use super::session_token::SessionTokenAuthProvider;
use crate::error::LlmError;

pub const DEFAULT_CONFIG_FILE: &str = "~/.oci/config";
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// A parsed configuration file.
#[derive(Debug, Clone, Default)]
pub struct OciConfigFile {
    path: Option<PathBuf>,
    sections: HashMap<String, HashMap<String, String>>,
}

impl OciConfigFile {
    pub fn parse(contents: &str) -> Result<Self, LlmError> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(LlmError::AuthenticationError(format!(
                    "Invalid OCI config line {}: expected key=value",
                    idx + 1
                )));
            };
            let Some(section) = current.as_ref() else {
                return Err(LlmError::AuthenticationError(format!(
                    "Invalid OCI config line {}: key outside of a [profile] section",
                    idx + 1
                )));
            };
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }

        Ok(Self {
            path: None,
            sections,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, LlmError> {
        let path = expand_home(path);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            LlmError::AuthenticationError(format!(
                "Failed to read OCI config file {}: {e}",
                path.display()
            ))
        })?;
        let mut file = Self::parse(&contents)?;
        file.path = Some(path);
        Ok(file)
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Resolve a profile, layering it over `[DEFAULT]`.
    pub fn profile(&self, name: &str) -> Result<OciProfile, LlmError> {
        let mut values = self
            .sections
            .get(DEFAULT_PROFILE)
            .cloned()
            .unwrap_or_default();
        match self.sections.get(name) {
            Some(section) => values.extend(section.clone()),
            None if name == DEFAULT_PROFILE && !values.is_empty() => {}
            None => {
                return Err(LlmError::AuthenticationError(format!(
                    "Profile '{name}' not found in OCI config file"
                )));
            }
        }
        Ok(OciProfile {
            name: name.to_string(),
            base_dir: self
                .path
                .as_ref()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf),
            values,
        })
    }
}

/// One resolved profile.
#[derive(Debug, Clone)]
pub struct OciProfile {
    name: String,
    base_dir: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl OciProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, LlmError> {
        self.get(key).ok_or_else(|| {
            LlmError::AuthenticationError(format!(
                "OCI config profile '{}' is missing '{key}'",
                self.name
            ))
        })
    }

    /// A file path from the profile; `~` is expanded and relative paths are
    /// resolved against the config file's directory.
    pub fn path(&self, key: &str) -> Result<PathBuf, LlmError> {
        let path = expand_home(Path::new(self.require(key)?));
        Ok(match (&self.base_dir, path.is_relative()) {
            (Some(base), true) => base.join(path),
            _ => path,
        })
    }

    /// Build the auth provider this profile describes: session-token auth
    /// when `security_token_file` is present, API key auth otherwise.
    pub async fn auth_provider(&self) -> Result<Arc<dyn OciAuthProvider>, LlmError> {
        if self.get("security_token_file").is_some() {
            let provider = SessionTokenAuthProvider::from_files(
                &self.path("security_token_file")?,
                &self.path("key_file")?,
            )
            .await?;
            return Ok(Arc::new(provider));
        }

        let provider = ApiKeyAuthProvider::from_key_file(
            self.require("tenancy")?,
            self.require("user")?,
            self.require("fingerprint")?,
            &self.path("key_file")?,
        )
        .await?;
        Ok(Arc::new(provider))
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
