//! Graph client and resource configuration.

use crate::error::{GraphError, GraphResult};
use provider_common::http::DEFAULT_USER_AGENT;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use url::Url;

/// Azure AD Graph client configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Graph endpoint, e.g. `https://graph.windows.net`
    pub endpoint: String,
    /// Directory (tenant) ID
    pub tenant_id: String,
    /// Bearer token for the Graph audience
    pub access_token: SecretString,
    /// `api-version` query parameter
    pub api_version: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
    /// Partner ID added to the user agent
    pub partner_id: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: env::var("AAD_GRAPH_ENDPOINT")
                .unwrap_or_else(|_| "https://graph.windows.net".to_string()),
            tenant_id: env::var("ARM_TENANT_ID").unwrap_or_default(),
            access_token: SecretString::from(env::var("AAD_GRAPH_ACCESS_TOKEN").unwrap_or_default()),
            api_version: "1.6".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            partner_id: env::var("ARM_PARTNER_ID").ok().filter(|p| !p.trim().is_empty()),
        }
    }
}

impl GraphConfig {
    /// Create a configuration for one tenant.
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            access_token: SecretString::from(access_token.into()),
            ..Default::default()
        }
    }

    /// Load configuration from the environment (and a `.env` file if present).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or the result fails [`Self::validate`].
    pub fn from_env() -> GraphResult<Self> {
        dotenvy::dotenv().ok();

        let timeout = Duration::from_secs(parse_env("AAD_GRAPH_TIMEOUT_SECS", 30)?);
        let config = Self::default().with_timeout(timeout);
        config.validate()?;
        Ok(config)
    }

    /// Set the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the partner ID.
    #[must_use]
    pub fn with_partner_id(mut self, partner_id: impl Into<String>) -> Self {
        self.partner_id = Some(partner_id.into());
        self
    }

    /// Check that the configuration can address a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> GraphResult<()> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| GraphError::InvalidConfig(format!("endpoint {:?}: {e}", self.endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GraphError::InvalidConfig(format!(
                "endpoint {:?} must use http or https",
                self.endpoint
            )));
        }
        if self.tenant_id.trim().is_empty() {
            return Err(GraphError::InvalidConfig("tenant_id is required".to_string()));
        }
        if self.access_token.expose_secret().trim().is_empty() {
            return Err(GraphError::InvalidConfig("access_token is required".to_string()));
        }
        Ok(())
    }
}

/// Polling behaviour of the replication wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// Delay between two reads of the credential list
    pub poll_interval: Duration,
    /// Successive reads that must see the credential
    pub consecutive_hits: u32,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            consecutive_hits: 10,
        }
    }
}

impl ReplicationConfig {
    /// Set the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the required number of successive hits (at least 1).
    #[must_use]
    pub fn with_consecutive_hits(mut self, hits: u32) -> Self {
        self.consecutive_hits = hits.max(1);
        self
    }
}

/// Operation timeouts of the credential resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    /// Budget for the replication wait after a create
    pub create: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(20 * 60),
        }
    }
}

impl ResourceTimeouts {
    /// Set the create timeout.
    #[must_use]
    pub const fn with_create(mut self, timeout: Duration) -> Self {
        self.create = timeout;
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> GraphResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| GraphError::InvalidConfig(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
