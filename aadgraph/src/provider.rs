//! Remote API seam for application key credentials.

use crate::error::GraphResult;
use crate::models::{Application, KeyCredential};
use async_trait::async_trait;

/// Directory operations the credential resources consume.
///
/// The key credential list has no partial update: callers read it whole and
/// write it back whole.
#[async_trait]
pub trait ApplicationsClient: Send + Sync {
    /// Fetch an application; a missing object yields [`GraphError::NotFound`](crate::GraphError::NotFound).
    async fn get_application(&self, object_id: &str) -> GraphResult<Application>;

    /// Fetch the full key credential list of an application.
    async fn list_key_credentials(&self, object_id: &str) -> GraphResult<Vec<KeyCredential>>;

    /// Replace the key credential list of an application.
    async fn update_key_credentials(
        &self,
        object_id: &str,
        credentials: Vec<KeyCredential>,
    ) -> GraphResult<()>;
}
