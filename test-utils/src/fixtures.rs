//! Test fixtures with sample data.

use aadgraph::{CertificateConfig, KeyCredential};
use chrono::{DateTime, TimeZone, Utc};

/// Object ID of the sample application.
pub const APPLICATION_OBJECT_ID: &str = "00000000-0000-0000-0000-00000000a001";

/// DER bytes wrapped by [`sample_certificate_pem`].
pub const SAMPLE_CERTIFICATE_DER: &[u8] = &[0x30, 0x82, 0x01, 0x0a, 0x02, 0x82, 0x01, 0x01];

/// Base64 of [`SAMPLE_CERTIFICATE_DER`], as the directory stores it.
pub const SAMPLE_CERTIFICATE_BASE64: &str = "MIIBCgKCAQE=";

/// PEM certificate block around [`SAMPLE_CERTIFICATE_DER`].
#[must_use]
pub fn sample_certificate_pem() -> String {
    pem::encode(&pem::Pem::new("CERTIFICATE", SAMPLE_CERTIFICATE_DER.to_vec()))
}

/// Fixed start date used by fixtures.
#[must_use]
pub fn start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Fixed end date used by fixtures.
#[must_use]
pub fn end_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// PEM certificate configuration with a fixed key ID and validity window.
#[must_use]
pub fn certificate_config(object_id: &str, key_id: &str) -> CertificateConfig {
    CertificateConfig::new(object_id, sample_certificate_pem())
        .with_key_id(key_id)
        .with_start_date(start_date())
        .with_end_date(end_date())
}

/// Key credential as the directory would return it.
#[must_use]
pub fn key_credential(key_id: &str) -> KeyCredential {
    KeyCredential {
        key_id: Some(key_id.to_string()),
        key_type: Some("AsymmetricX509Cert".to_string()),
        usage: Some("Verify".to_string()),
        start_date: Some(start_date()),
        end_date: Some(end_date()),
        value: Some(SAMPLE_CERTIFICATE_BASE64.to_string()),
        custom_key_identifier: None,
    }
}
