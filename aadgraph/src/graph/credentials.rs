//! Editing the key credential list of an application.
//!
//! The directory only accepts whole-list replacement, so every function here
//! takes a full snapshot and returns a full replacement snapshot.

use crate::application_certificate::CertificateConfig;
use crate::error::{CredentialError, CredentialResult};
use crate::models::{KeyCredential, KeyEncoding};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::ExposeSecret;
use uuid::Uuid;

/// Usage the directory expects for certificate credentials.
pub const KEY_USAGE_VERIFY: &str = "Verify";

/// Append `credential` to `existing`.
///
/// # Errors
///
/// Returns [`CredentialError::AlreadyExists`] when a record with the same key ID
/// is already present.
pub fn add(existing: Vec<KeyCredential>, credential: KeyCredential) -> CredentialResult<Vec<KeyCredential>> {
    if let Some(key_id) = credential.key_id.as_deref() {
        if find_by_key_id(&existing, key_id).is_some() {
            return Err(CredentialError::AlreadyExists {
                kind: "Key Credential",
                key_id: key_id.to_string(),
            });
        }
    }

    let mut updated = existing;
    updated.push(credential);
    Ok(updated)
}

/// Find the record with `key_id`.
#[must_use]
pub fn find_by_key_id<'a>(credentials: &'a [KeyCredential], key_id: &str) -> Option<&'a KeyCredential> {
    credentials.iter().find(|c| c.has_key_id(key_id))
}

/// Drop the record with `key_id`, keeping the others in order.
#[must_use]
pub fn remove_by_key_id(existing: Vec<KeyCredential>, key_id: &str) -> Vec<KeyCredential> {
    existing.into_iter().filter(|c| !c.has_key_id(key_id)).collect()
}

/// Fresh random key ID.
#[must_use]
pub fn random_key_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the key credential described by a resource configuration.
///
/// A missing `key_id` is filled from `new_key_id` and a missing
/// `start_date` with `now`. The end date is either configured directly or
/// relative to the start date.
///
/// # Errors
///
/// Returns [`CredentialError::InvalidConfig`] when the value cannot be decoded
/// with its encoding or no end date can be determined.
pub fn key_credential_for_resource(
    config: &CertificateConfig,
    now: DateTime<Utc>,
    new_key_id: impl FnOnce() -> String,
) -> CredentialResult<KeyCredential> {
    let value = encode_value(config.encoding, config.value.expose_secret())?;

    let key_id = config.key_id.clone().unwrap_or_else(new_key_id);

    let start_date = config.start_date.unwrap_or(now);
    let end_date = match (config.end_date, config.end_date_relative) {
        (Some(end_date), _) => end_date,
        (None, Some(relative)) => {
            let delta = TimeDelta::from_std(relative).map_err(|e| {
                CredentialError::invalid_config(format!("end_date_relative {relative:?}: {e}"))
            })?;
            start_date.checked_add_signed(delta).ok_or_else(|| {
                CredentialError::invalid_config(format!(
                    "end_date_relative {relative:?} overflows the start date"
                ))
            })?
        }
        (None, None) => {
            return Err(CredentialError::invalid_config(
                "one of `end_date` or `end_date_relative` must be specified",
            ));
        }
    };

    Ok(KeyCredential {
        key_id: Some(key_id),
        key_type: Some(config.key_type.as_str().to_string()),
        usage: Some(KEY_USAGE_VERIFY.to_string()),
        start_date: Some(start_date),
        end_date: Some(end_date),
        value: Some(value),
        custom_key_identifier: None,
    })
}

fn encode_value(encoding: KeyEncoding, value: &str) -> CredentialResult<String> {
    match encoding {
        KeyEncoding::Base64 => Ok(value.to_string()),
        KeyEncoding::Hex => {
            let bytes = hex::decode(value.trim()).map_err(|e| {
                CredentialError::invalid_config(format!("decoding hex certificate value: {e}"))
            })?;
            Ok(STANDARD.encode(bytes))
        }
        KeyEncoding::Pem => {
            let block = pem::parse(value).map_err(|e| {
                CredentialError::invalid_config(format!("failed to decode certificate PEM: {e}"))
            })?;
            Ok(STANDARD.encode(block.contents()))
        }
    }
}
