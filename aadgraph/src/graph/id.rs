//! Composite resource identifier `{objectId}/{kind}/{keyId}`.

use crate::error::{CredentialError, CredentialResult};
use std::fmt;
use std::str::FromStr;

/// Kind tag in the middle segment of a credential identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Certificate (key credential)
    Certificate,
    /// Password credential
    Password,
}

impl CredentialKind {
    /// Tag used in identifiers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "certificate" => Ok(Self::Certificate),
            "password" => Ok(Self::Password),
            "" => Err(CredentialError::format(
                "Type in {objectId}/{keyType}/{keyId} should not be blank",
            )),
            other => Err(CredentialError::format(format!(
                "Key type {other:?} isn't 'certificate' or 'password'"
            ))),
        }
    }
}

/// Identifier of one credential on one application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialId {
    /// Object ID of the parent application
    pub object_id: String,
    /// Credential kind
    pub kind: CredentialKind,
    /// Key ID of the credential
    pub key_id: String,
}

impl CredentialId {
    /// Build an identifier from its parts.
    #[must_use]
    pub fn new(object_id: impl Into<String>, kind: CredentialKind, key_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            kind,
            key_id: key_id.into(),
        }
    }

    /// Parse `{objectId}/{kind}/{keyId}`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Format`] when the segment count is not three,
    /// a segment is empty, or the kind tag is unknown.
    pub fn parse(raw: &str) -> CredentialResult<Self> {
        let parts: Vec<&str> = raw.split('/').collect();
        let [object_id, kind, key_id] = parts.as_slice() else {
            return Err(CredentialError::format(format!(
                "Credential ID expected to be in the format {{objectId}}/{{keyType}}/{{keyId}} - but got {raw:?}"
            )));
        };

        let kind = kind.parse()?;
        if object_id.is_empty() {
            return Err(CredentialError::format(format!("Object ID in {raw:?} should not be blank")));
        }
        if key_id.is_empty() {
            return Err(CredentialError::format(format!("Key ID in {raw:?} should not be blank")));
        }

        Ok(Self::new(*object_id, kind, *key_id))
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.object_id, self.kind, self.key_id)
    }
}

impl FromStr for CredentialId {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse an identifier that must name a certificate.
///
/// # Errors
///
/// Returns [`CredentialError::Format`] for malformed identifiers and for
/// identifiers of any other kind.
pub fn parse_certificate_id(raw: &str) -> CredentialResult<CredentialId> {
    let id = CredentialId::parse(raw)?;
    if id.kind != CredentialKind::Certificate {
        return Err(CredentialError::format(format!(
            "Credential ID {raw:?} is of kind {:?}, expected \"certificate\"",
            id.kind.as_str()
        )));
    }
    Ok(id)
}
