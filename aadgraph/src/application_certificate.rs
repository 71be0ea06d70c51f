//! The `azuread_application_certificate` resource.
//!
//! A certificate credential is one entry in the key credential list of an
//! application. Create and delete rewrite the whole list while holding the
//! application's named lock; create then waits for the directory to
//! replicate the new entry. A missing application means the credential is
//! gone too, so read and delete treat it as absence rather than failure.

use crate::config::{ReplicationConfig, ResourceTimeouts};
use crate::error::{CredentialError, CredentialResult};
use crate::graph::{self, CredentialId, CredentialKind, ReplicationWaiter, parse_certificate_id};
use crate::models::{KeyCredential, KeyEncoding, KeyType};
use crate::provider::ApplicationsClient;
use chrono::{DateTime, SecondsFormat, Utc};
use provider_common::{Clock, NamedLocks};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Terraform type name of the resource.
pub const RESOURCE_TYPE: &str = "azuread_application_certificate";

/// Configuration of one certificate credential.
#[derive(Debug, Clone)]
pub struct CertificateConfig {
    /// Object ID of the application owning the credential
    pub application_object_id: String,
    /// Key ID; generated when not set
    pub key_id: Option<String>,
    /// Credential type
    pub key_type: KeyType,
    /// Encoding of `value`
    pub encoding: KeyEncoding,
    /// Certificate material
    pub value: SecretString,
    /// Start of validity; defaults to the time of creation
    pub start_date: Option<DateTime<Utc>>,
    /// End of validity
    pub end_date: Option<DateTime<Utc>>,
    /// End of validity relative to the start date, used when `end_date` is unset
    pub end_date_relative: Option<Duration>,
}

impl CertificateConfig {
    /// Configuration for a PEM certificate on an application.
    #[must_use]
    pub fn new(application_object_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            application_object_id: application_object_id.into(),
            key_id: None,
            key_type: KeyType::default(),
            encoding: KeyEncoding::default(),
            value: SecretString::from(value.into()),
            start_date: None,
            end_date: None,
            end_date_relative: None,
        }
    }

    /// Set the key ID.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Set the credential type.
    #[must_use]
    pub const fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }

    /// Set the value encoding.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Set the end date.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Set the end date relative to the start date.
    #[must_use]
    pub const fn with_end_date_relative(mut self, relative: Duration) -> Self {
        self.end_date_relative = Some(relative);
        self
    }
}

/// Attributes of a present certificate credential, refreshed from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateState {
    /// Composite resource identifier
    pub id: String,
    /// Object ID of the owning application
    pub application_object_id: String,
    /// Key ID of the credential
    pub key_id: String,
    /// Credential type reported by the directory
    pub key_type: Option<String>,
    /// RFC 3339
    pub start_date: Option<String>,
    /// RFC 3339
    pub end_date: Option<String>,
}

impl CertificateState {
    fn from_credential(id: &CredentialId, credential: &KeyCredential) -> Self {
        let rfc3339 = |d: DateTime<Utc>| d.to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            id: id.to_string(),
            application_object_id: id.object_id.clone(),
            key_id: id.key_id.clone(),
            key_type: credential.key_type.clone(),
            start_date: credential.start_date.map(rfc3339),
            end_date: credential.end_date.map(rfc3339),
        }
    }
}

/// Lifecycle handlers of [`RESOURCE_TYPE`].
pub struct ApplicationCertificateResource {
    client: Arc<dyn ApplicationsClient>,
    locks: Arc<NamedLocks>,
    waiter: ReplicationWaiter,
    timeouts: ResourceTimeouts,
}

impl std::fmt::Debug for ApplicationCertificateResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationCertificateResource")
            .field("waiter", &self.waiter)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl ApplicationCertificateResource {
    /// Create the handlers. `locks` must be shared by every resource that
    /// rewrites application credential lists.
    #[must_use]
    pub fn new(client: Arc<dyn ApplicationsClient>, locks: Arc<NamedLocks>) -> Self {
        Self {
            client,
            locks,
            waiter: ReplicationWaiter::default(),
            timeouts: ResourceTimeouts::default(),
        }
    }

    /// Replace the replication polling behaviour and its clock.
    #[must_use]
    pub fn with_replication(mut self, config: ReplicationConfig, clock: Arc<dyn Clock>) -> Self {
        self.waiter = ReplicationWaiter::new(config, clock);
        self
    }

    /// Replace the operation timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: ResourceTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Validate an identifier before importing an existing credential.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Format`] if `id` is not a certificate identifier.
    pub fn import(id: &str) -> CredentialResult<CredentialId> {
        parse_certificate_id(id)
    }

    /// Add the configured certificate to its application.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Format`] if the object ID and key ID do not form
    /// a valid identifier, [`CredentialError::ImportAsExists`] if the key ID is
    /// already on the application, [`CredentialError::Timeout`] if the write does not
    /// replicate in time, and [`CredentialError::Remote`] for API failures.
    #[instrument(skip_all, fields(object_id = %config.application_object_id))]
    pub async fn create(&self, config: &CertificateConfig) -> CredentialResult<CertificateState> {
        let object_id = config.application_object_id.as_str();
        if object_id.trim().is_empty() {
            return Err(CredentialError::invalid_config("application_object_id is required"));
        }
        let credential =
            graph::key_credential_for_resource(config, Utc::now(), graph::random_key_id)?;
        let key_id = credential.key_id.clone().unwrap_or_default();
        let id = CredentialId::new(object_id, CredentialKind::Certificate, key_id.as_str());
        let raw_id = id.to_string();
        parse_certificate_id(&raw_id)?;

        let guard = self.locks.lock(object_id).await;

        let existing = self.client.list_key_credentials(object_id).await.map_err(|e| {
            CredentialError::remote(
                format!("listing certificate credentials for application with object ID {object_id:?}"),
                e,
            )
        })?;

        let updated = match graph::add(existing, credential) {
            Ok(updated) => updated,
            Err(CredentialError::AlreadyExists { .. }) => {
                return Err(CredentialError::ImportAsExists {
                    resource_type: RESOURCE_TYPE,
                    id: raw_id,
                });
            }
            Err(e) => return Err(e),
        };

        self.client
            .update_key_credentials(object_id, updated)
            .await
            .map_err(|e| {
                CredentialError::remote(
                    format!(
                        "creating certificate credentials {key_id:?} for application with object ID {object_id:?}"
                    ),
                    e,
                )
            })?;

        self.waiter
            .wait_for_key_credential(&key_id, self.timeouts.create, || {
                self.client.list_key_credentials(object_id)
            })
            .await?;

        guard.unlock();
        info!(key_id = %key_id, "Added certificate credential");

        self.read(&raw_id)
            .await?
            .ok_or_else(|| CredentialError::NotFound(format!("certificate credential {raw_id:?}")))
    }

    /// Refresh the credential from the directory.
    ///
    /// Returns `None` when the application or the credential no longer exists,
    /// meaning the resource should be dropped from state.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Format`] for a malformed `id` and
    /// [`CredentialError::Remote`] for API failures.
    #[instrument(skip(self))]
    pub async fn read(&self, id: &str) -> CredentialResult<Option<CertificateState>> {
        let id = parse_certificate_id(id)?;

        if let Err(e) = self.client.get_application(&id.object_id).await {
            if e.is_not_found() {
                debug!(object_id = %id.object_id, "Application was not found - removing from state");
                return Ok(None);
            }
            return Err(CredentialError::remote(
                format!("retrieving application with object ID {:?}", id.object_id),
                e,
            ));
        }

        let credentials = self
            .client
            .list_key_credentials(&id.object_id)
            .await
            .map_err(|e| {
                CredentialError::remote(
                    format!(
                        "listing certificate credentials for application with object ID {:?}",
                        id.object_id
                    ),
                    e,
                )
            })?;

        let Some(credential) = graph::find_by_key_id(&credentials, &id.key_id) else {
            debug!(
                object_id = %id.object_id,
                key_id = %id.key_id,
                "Certificate credential was not found - removing from state"
            );
            return Ok(None);
        };

        Ok(Some(CertificateState::from_credential(&id, credential)))
    }

    /// Remove the credential from its application.
    ///
    /// Succeeds without writing when the application is already gone.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Format`] for a malformed `id` and
    /// [`CredentialError::Remote`] for API failures.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> CredentialResult<()> {
        let id = parse_certificate_id(id)?;

        let guard = self.locks.lock(&id.object_id).await;

        if let Err(e) = self.client.get_application(&id.object_id).await {
            if e.is_not_found() {
                debug!(object_id = %id.object_id, "Application was not found - removing from state");
                return Ok(());
            }
            return Err(CredentialError::remote(
                format!("retrieving application with object ID {:?}", id.object_id),
                e,
            ));
        }

        let existing = self
            .client
            .list_key_credentials(&id.object_id)
            .await
            .map_err(|e| {
                CredentialError::remote(
                    format!("listing certificate credentials for application {:?}", id.object_id),
                    e,
                )
            })?;

        let updated = graph::remove_by_key_id(existing, &id.key_id);
        self.client
            .update_key_credentials(&id.object_id, updated)
            .await
            .map_err(|e| {
                CredentialError::remote(
                    format!(
                        "removing certificate credentials {:?} from application with object ID {:?}",
                        id.key_id, id.object_id
                    ),
                    e,
                )
            })?;

        guard.unlock();
        info!(object_id = %id.object_id, key_id = %id.key_id, "Removed certificate credential");
        Ok(())
    }
}
