//! Helpers shared by the application credential resources.

pub mod credentials;
pub mod id;
pub mod replication;

pub use credentials::{
    add, find_by_key_id, key_credential_for_resource, random_key_id, remove_by_key_id,
};
pub use id::{CredentialId, CredentialKind, parse_certificate_id};
pub use replication::ReplicationWaiter;
