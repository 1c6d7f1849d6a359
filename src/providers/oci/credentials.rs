//! Credential descriptor
//!
//! A declarative description of the fields a host must collect before an
//! [`super::OciClient`] can be built. Hosts render it as a form; this crate
//! only enforces it through [`super::OciCredentials::from_value`].

use serde::Serialize;

/// Input kind of a credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Options,
}

/// One selectable value of an `options` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    /// Human readable label
    pub name: &'static str,
    pub value: &'static str,
}

/// A single credential field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialField {
    pub name: &'static str,
    pub display_name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Masked in host UIs
    pub secret: bool,
    pub required: bool,
    pub default: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

/// Named collection of credential fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub properties: Vec<CredentialField>,
}

impl CredentialDescriptor {
    /// Look up a field by its machine name.
    pub fn field(&self, name: &str) -> Option<&CredentialField> {
        self.properties.iter().find(|f| f.name == name)
    }
}
