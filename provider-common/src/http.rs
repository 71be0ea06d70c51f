//! Shared `reqwest` client for directory API calls.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// User agent sent when the caller does not set one.
pub const DEFAULT_USER_AGENT: &str = "terraform-provider-azuread-rs/0.1";

/// Settings for the provider's HTTP client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Base user agent
    pub user_agent: String,
    /// Partner ID appended to the user agent as `pid-{id}`
    pub partner_id: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            partner_id: None,
        }
    }
}

impl HttpConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the base user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Attribute requests to a partner. Blank IDs are ignored.
    #[must_use]
    pub fn with_partner_id(mut self, partner_id: impl Into<String>) -> Self {
        let partner_id = partner_id.into();
        self.partner_id = (!partner_id.trim().is_empty()).then_some(partner_id);
        self
    }

    /// User agent actually sent on the wire.
    #[must_use]
    pub fn effective_user_agent(&self) -> String {
        match &self.partner_id {
            Some(pid) => format!("{} pid-{}", self.user_agent, pid.trim()),
            None => self.user_agent.clone(),
        }
    }
}

/// Build the JSON API client used by every directory call.
///
/// # Errors
///
/// Returns an error if TLS initialization fails.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.effective_user_agent())
        .default_headers(headers)
        .use_rustls_tls()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_without_partner() {
        let config = HttpConfig::default();
        assert_eq!(config.effective_user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_partner_id_is_appended() {
        let config = HttpConfig::default()
            .with_user_agent("acctest")
            .with_partner_id("00000000-0000-0000-0000-0000000000ab");

        assert_eq!(
            config.effective_user_agent(),
            "acctest pid-00000000-0000-0000-0000-0000000000ab"
        );
    }

    #[test]
    fn test_blank_partner_id_is_ignored() {
        let config = HttpConfig::default().with_partner_id("  ");
        assert!(config.partner_id.is_none());
    }

    #[test]
    fn test_timeouts() {
        let config = HttpConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_build_client() {
        assert!(build_http_client(&HttpConfig::default().with_partner_id("pid")).is_ok());
    }
}
