//! Proptest generators for credential resources.

use aadgraph::{CredentialId, CredentialKind, KeyCredential};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Application object IDs: UUIDs and free-form slugs without `/`.
pub fn object_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}",
        "[a-z][a-z0-9-]{0,30}",
    ]
}

/// Key IDs.
pub fn key_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}",
        "[a-z][a-z0-9-]{0,20}",
    ]
}

/// Credential kinds.
pub fn credential_kind_strategy() -> impl Strategy<Value = CredentialKind> {
    prop_oneof![Just(CredentialKind::Certificate), Just(CredentialKind::Password)]
}

/// Valid credential identifiers.
pub fn credential_id_strategy() -> impl Strategy<Value = CredentialId> {
    (object_id_strategy(), credential_kind_strategy(), key_id_strategy())
        .prop_map(|(object_id, kind, key_id)| CredentialId::new(object_id, kind, key_id))
}

fn date_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (1_600_000_000i64..2_000_000_000i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

/// A key credential with the given key ID and arbitrary other fields.
pub fn key_credential_with_id(key_id: String) -> impl Strategy<Value = KeyCredential> {
    (
        prop::option::of(prop_oneof![
            Just("AsymmetricX509Cert".to_string()),
            Just("Symmetric".to_string()),
        ]),
        prop::option::of(date_strategy()),
        prop::option::of(date_strategy()),
        prop::option::of("[A-Za-z0-9+/]{8,64}"),
    )
        .prop_map(move |(key_type, start_date, end_date, value)| KeyCredential {
            key_id: Some(key_id.clone()),
            key_type,
            usage: Some("Verify".to_string()),
            start_date,
            end_date,
            value,
            custom_key_identifier: None,
        })
}

/// Credential lists whose key IDs are unique.
pub fn key_credential_list_strategy(max_len: usize) -> impl Strategy<Value = Vec<KeyCredential>> {
    prop::collection::btree_set(key_id_strategy(), 0..=max_len)
        .prop_flat_map(|ids: BTreeSet<String>| {
            ids.into_iter()
                .map(key_credential_with_id)
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}
