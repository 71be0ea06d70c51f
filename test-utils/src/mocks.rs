//! In-memory applications API.
//!
//! Behaves like the directory for the calls the credential resources make:
//! whole-list reads and writes per application, optional replication lag
//! after writes, and injected failures.

use aadgraph::{Application, ApplicationsClient, GraphError, GraphResult, KeyCredential};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `get_application(object_id)`
    GetApplication(String),
    /// `list_key_credentials(object_id)`
    ListKeyCredentials(String),
    /// `update_key_credentials(object_id, list)` with the written key IDs
    UpdateKeyCredentials(String, Vec<String>),
}

#[derive(Debug, Default)]
struct AppRecord {
    credentials: Vec<KeyCredential>,
    /// Snapshot served while a write is still replicating
    stale: Option<Vec<KeyCredential>>,
    stale_reads_left: u32,
}

/// Failure to inject on the next matching call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Respond 404
    NotFound,
    /// Respond 403
    PermissionDenied,
    /// Respond 429
    RateLimited,
    /// Respond 503
    Unavailable,
}

impl Failure {
    fn into_error(self, what: &str) -> GraphError {
        match self {
            Self::NotFound => GraphError::not_found(what),
            Self::PermissionDenied => GraphError::PermissionDenied(what.to_string()),
            Self::RateLimited => GraphError::RateLimited,
            Self::Unavailable => GraphError::unavailable(format!("Status 503: {what}")),
        }
    }
}

/// In-memory [`ApplicationsClient`].
#[derive(Debug, Default)]
pub struct MockApplicationsClient {
    apps: RwLock<HashMap<String, AppRecord>>,
    calls: RwLock<Vec<ApiCall>>,
    replication_lag: RwLock<u32>,
    call_delay: RwLock<Option<Duration>>,
    list_failures: RwLock<VecDeque<Failure>>,
    update_failures: RwLock<VecDeque<Failure>>,
    get_failures: RwLock<VecDeque<Failure>>,
}

impl MockApplicationsClient {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory behind an `Arc`.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register an application with an initial credential list.
    pub async fn insert_application(&self, object_id: &str, credentials: Vec<KeyCredential>) {
        self.apps.write().await.insert(
            object_id.to_string(),
            AppRecord {
                credentials,
                ..AppRecord::default()
            },
        );
    }

    /// Delete an application.
    pub async fn remove_application(&self, object_id: &str) {
        self.apps.write().await.remove(object_id);
    }

    /// Serve the pre-write list for the next `reads` list calls after each write.
    pub async fn set_replication_lag(&self, reads: u32) {
        *self.replication_lag.write().await = reads;
    }

    /// Sleep this long inside every list and update call.
    pub async fn set_call_delay(&self, delay: Duration) {
        *self.call_delay.write().await = Some(delay);
    }

    /// Fail the next list call.
    pub async fn fail_next_list(&self, failure: Failure) {
        self.list_failures.write().await.push_back(failure);
    }

    /// Fail the next update call.
    pub async fn fail_next_update(&self, failure: Failure) {
        self.update_failures.write().await.push_back(failure);
    }

    /// Fail the next get call.
    pub async fn fail_next_get(&self, failure: Failure) {
        self.get_failures.write().await.push_back(failure);
    }

    /// Authoritative credential list of an application.
    pub async fn credentials(&self, object_id: &str) -> Option<Vec<KeyCredential>> {
        self.apps
            .read()
            .await
            .get(object_id)
            .map(|app| app.credentials.clone())
    }

    /// Calls received so far.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.read().await.clone()
    }

    /// Number of update calls received so far.
    pub async fn update_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, ApiCall::UpdateKeyCredentials(..)))
            .count()
    }

    async fn record(&self, call: ApiCall) {
        self.calls.write().await.push(call);
    }

    async fn delay(&self) {
        let delay = *self.call_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ApplicationsClient for MockApplicationsClient {
    async fn get_application(&self, object_id: &str) -> GraphResult<Application> {
        self.record(ApiCall::GetApplication(object_id.to_string())).await;
        if let Some(failure) = self.get_failures.write().await.pop_front() {
            return Err(failure.into_error(&format!("applications/{object_id}")));
        }

        if self.apps.read().await.contains_key(object_id) {
            Ok(Application {
                object_id: Some(object_id.to_string()),
                ..Application::default()
            })
        } else {
            Err(GraphError::not_found(format!("applications/{object_id}")))
        }
    }

    async fn list_key_credentials(&self, object_id: &str) -> GraphResult<Vec<KeyCredential>> {
        self.record(ApiCall::ListKeyCredentials(object_id.to_string())).await;
        self.delay().await;
        if let Some(failure) = self.list_failures.write().await.pop_front() {
            return Err(failure.into_error(&format!("applications/{object_id}/keyCredentials")));
        }

        let mut apps = self.apps.write().await;
        let app = apps
            .get_mut(object_id)
            .ok_or_else(|| GraphError::not_found(format!("applications/{object_id}/keyCredentials")))?;

        if app.stale_reads_left > 0 {
            app.stale_reads_left -= 1;
            if let Some(stale) = &app.stale {
                return Ok(stale.clone());
            }
        }
        Ok(app.credentials.clone())
    }

    async fn update_key_credentials(
        &self,
        object_id: &str,
        credentials: Vec<KeyCredential>,
    ) -> GraphResult<()> {
        let key_ids = credentials
            .iter()
            .filter_map(|c| c.key_id.clone())
            .collect();
        self.record(ApiCall::UpdateKeyCredentials(object_id.to_string(), key_ids))
            .await;
        self.delay().await;
        if let Some(failure) = self.update_failures.write().await.pop_front() {
            return Err(failure.into_error(&format!("applications/{object_id}/keyCredentials")));
        }

        let lag = *self.replication_lag.read().await;
        let mut apps = self.apps.write().await;
        let app = apps
            .get_mut(object_id)
            .ok_or_else(|| GraphError::not_found(format!("applications/{object_id}/keyCredentials")))?;

        let previous = std::mem::replace(&mut app.credentials, credentials);
        if lag > 0 {
            app.stale = Some(previous);
            app.stale_reads_left = lag;
        }
        Ok(())
    }
}
