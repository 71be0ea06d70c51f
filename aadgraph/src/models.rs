//! Azure AD Graph wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application object. Only its existence matters to the credential resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Directory object ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Application (client) ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Key credential attached to an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCredential {
    /// Key ID, unique within the application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Credential type, `AsymmetricX509Cert` or `Symmetric`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    /// Key usage, `Verify` for certificates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Start of validity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// End of validity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Base64-encoded public certificate material
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Custom key identifier, usually the certificate thumbprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_key_identifier: Option<String>,
}

impl KeyCredential {
    /// Whether this record carries the given key ID.
    #[must_use]
    pub fn has_key_id(&self, key_id: &str) -> bool {
        self.key_id.as_deref() == Some(key_id)
    }
}

/// Body of the `keyCredentials` list and update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCredentialList {
    /// Credentials in list order
    #[serde(default)]
    pub value: Vec<KeyCredential>,
}

impl From<Vec<KeyCredential>> for KeyCredentialList {
    fn from(value: Vec<KeyCredential>) -> Self {
        Self { value }
    }
}

/// Credential type accepted by the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// X.509 certificate
    #[default]
    AsymmetricX509Cert,
    /// Symmetric key
    Symmetric,
}

impl KeyType {
    /// Name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AsymmetricX509Cert => "AsymmetricX509Cert",
            Self::Symmetric => "Symmetric",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AsymmetricX509Cert" => Ok(Self::AsymmetricX509Cert),
            "Symmetric" => Ok(Self::Symmetric),
            other => Err(format!("unsupported key type {other:?}")),
        }
    }
}

/// Encoding of the certificate value in the resource configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyEncoding {
    /// PEM block; its DER contents are sent
    #[default]
    Pem,
    /// Already base64-encoded DER
    Base64,
    /// Hex-encoded DER
    Hex,
}

impl KeyEncoding {
    /// Configuration name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pem => "pem",
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }
}

impl FromStr for KeyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pem" => Ok(Self::Pem),
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            other => Err(format!("unsupported encoding {other:?}")),
        }
    }
}

/// Graph `odata.error` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorBody {
    #[serde(rename = "odata.error")]
    pub error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorDetail {
    #[serde(default)]
    pub code: String,
    pub message: GraphErrorMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorMessage {
    #[serde(default)]
    pub value: String,
}
