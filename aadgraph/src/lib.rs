//! Azure AD Graph application certificate credentials.
//!
//! Reconciles the `azuread_application_certificate` resource against the
//! key credential list of an application object: add or remove one
//! credential with a read-modify-write of the whole list, serialized per
//! application, then wait for the directory to replicate the write.

#![deny(missing_docs)]

pub mod application_certificate;
pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod provider;

pub use application_certificate::{
    ApplicationCertificateResource, CertificateConfig, CertificateState, RESOURCE_TYPE,
};
pub use client::GraphClient;
pub use config::{GraphConfig, ReplicationConfig, ResourceTimeouts};
pub use error::{CredentialError, CredentialResult, GraphError, GraphResult};
pub use graph::id::{CredentialId, CredentialKind};
pub use models::{Application, KeyCredential, KeyCredentialList, KeyEncoding, KeyType};
pub use provider::ApplicationsClient;
