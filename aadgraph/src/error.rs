//! Error types using thiserror 2.0.
//!
//! [`GraphError`] describes failures of the remote directory API.
//! [`CredentialError`] is what the lifecycle handlers return: malformed
//! identifiers, duplicate keys, replication timeouts and remote failures
//! wrapped with the operation that hit them.

use std::time::Duration;
use thiserror::Error;

/// Azure AD Graph API errors.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The addressed object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access token missing, expired or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Token lacks the directory permissions for the call
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Throttled by the directory
    #[error("Rate limited")]
    RateLimited,

    /// Directory unavailable or returned a server error
    #[error("Graph unavailable: {0}")]
    Unavailable(String),

    /// Any other unsuccessful response
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message reported by the directory
        message: String,
    },

    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Graph API calls.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Whether the error reports a missing object.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the failure is transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::RateLimited | Self::Http(_))
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Errors returned by the credential lifecycle handlers.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Malformed resource identifier
    #[error("parsing credential ID: {0}")]
    Format(String),

    /// A credential with the same key ID is already on the list
    #[error("{kind} with key ID {key_id:?} already exists")]
    AlreadyExists {
        /// Kind of credential
        kind: &'static str,
        /// Colliding key ID
        key_id: String,
    },

    /// The resource exists remotely but is not tracked; it must be imported
    #[error(
        "A resource with the ID {id:?} already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {resource_type:?} for more information."
    )]
    ImportAsExists {
        /// Terraform resource type
        resource_type: &'static str,
        /// Composite identifier of the existing resource
        id: String,
    },

    /// Expected object is missing
    #[error("{0} was not found")]
    NotFound(String),

    /// Replication did not converge in time
    #[error("timed out after {timeout:?} waiting for key credential {key_id:?} to replicate")]
    Timeout {
        /// Key ID being waited on
        key_id: String,
        /// Budget that elapsed
        timeout: Duration,
    },

    /// Remote API failure with operation context
    #[error("{context}: {source}")]
    Remote {
        /// Operation and identifier that failed
        context: String,
        /// Underlying API error
        #[source]
        source: GraphError,
    },

    /// Resource configuration cannot be turned into a credential
    #[error("invalid certificate configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for lifecycle handlers.
pub type CredentialResult<T> = Result<T, CredentialError>;

impl CredentialError {
    /// Wrap a remote error with the operation that produced it.
    #[must_use]
    pub fn remote(context: impl Into<String>, source: GraphError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }

    /// Create a format error.
    #[must_use]
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::not_found("applications/app-1");
        assert_eq!(err.to_string(), "Not found: applications/app-1");

        let err = GraphError::Status {
            status: 400,
            message: "Bad keyCredentials".to_string(),
        };
        assert_eq!(err.to_string(), "Unexpected status 400: Bad keyCredentials");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(GraphError::unavailable("503").is_retryable());
        assert!(GraphError::RateLimited.is_retryable());
        assert!(!GraphError::not_found("app").is_retryable());
        assert!(!GraphError::PermissionDenied("app".to_string()).is_retryable());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(GraphError::not_found("app").is_not_found());
        assert!(!GraphError::RateLimited.is_not_found());
    }

    #[test]
    fn test_remote_error_keeps_context_and_source() {
        let err = CredentialError::remote(
            "listing certificate credentials for application with object ID \"app-1\"",
            GraphError::RateLimited,
        );
        assert_eq!(
            err.to_string(),
            "listing certificate credentials for application with object ID \"app-1\": Rate limited"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_import_as_exists_mentions_id() {
        let err = CredentialError::ImportAsExists {
            resource_type: "azuread_application_certificate",
            id: "app-1/certificate/k1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"app-1/certificate/k1\""));
        assert!(msg.contains("imported into the State"));
    }
}
