//! Azure AD Graph HTTP client.

use crate::{
    config::GraphConfig,
    error::{GraphError, GraphResult},
    models::{Application, GraphErrorBody, KeyCredential, KeyCredentialList},
    provider::ApplicationsClient,
};
use async_trait::async_trait;
use provider_common::{HttpConfig, build_http_client};
use reqwest::{Client, Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

/// Applications client for the Azure AD Graph API.
pub struct GraphClient {
    config: GraphConfig,
    http: Client,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("endpoint", &self.config.endpoint)
            .field("tenant_id", &self.config.tenant_id)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: GraphConfig) -> GraphResult<Self> {
        config.validate()?;

        let mut http_config = HttpConfig::default()
            .with_timeout(config.timeout)
            .with_user_agent(config.user_agent.clone());
        if let Some(partner_id) = &config.partner_id {
            http_config = http_config.with_partner_id(partner_id.clone());
        }
        let http = build_http_client(&http_config)?;

        Ok(Self { config, http })
    }

    /// Build `{endpoint}/{tenant}/{segments..}?api-version=..`, percent-encoding
    /// every segment.
    fn url(&self, segments: &[&str]) -> GraphResult<Url> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| {
            GraphError::InvalidConfig(format!("endpoint {:?}: {e}", self.config.endpoint))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                GraphError::InvalidConfig(format!(
                    "endpoint {:?} cannot be a base URL",
                    self.config.endpoint
                ))
            })?
            .pop_if_empty()
            .push(&self.config.tenant_id)
            .extend(segments);
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&KeyCredentialList>,
    ) -> GraphResult<Response> {
        let url = self.url(segments)?;
        let path = url.path().to_string();
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.config.access_token.expose_secret());

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        warn!(%path, status = status.as_u16(), %message, "Graph request failed");

        Err(match status {
            StatusCode::NOT_FOUND => GraphError::not_found(path),
            StatusCode::UNAUTHORIZED => GraphError::Unauthorized(message),
            StatusCode::FORBIDDEN => GraphError::PermissionDenied(message),
            StatusCode::TOO_MANY_REQUESTS => GraphError::RateLimited,
            s if s.is_server_error() => GraphError::unavailable(format!("Status {s}: {message}")),
            s => GraphError::Status {
                status: s.as_u16(),
                message,
            },
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> GraphResult<T> {
        let response = self.send(Method::GET, segments, None).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Prefer the `odata.error` message over the raw body.
async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<GraphErrorBody>(&text).map_or(text, |body| {
        if body.error.code.is_empty() {
            body.error.message.value
        } else {
            format!("{}: {}", body.error.code, body.error.message.value)
        }
    })
}

#[async_trait]
impl ApplicationsClient for GraphClient {
    #[instrument(skip(self))]
    async fn get_application(&self, object_id: &str) -> GraphResult<Application> {
        debug!("Getting application");
        self.get(&["applications", object_id]).await
    }

    #[instrument(skip(self))]
    async fn list_key_credentials(&self, object_id: &str) -> GraphResult<Vec<KeyCredential>> {
        let list: KeyCredentialList = self
            .get(&["applications", object_id, "keyCredentials"])
            .await?;
        debug!(count = list.value.len(), "Listed key credentials");
        Ok(list.value)
    }

    #[instrument(skip(self, credentials), fields(count = credentials.len()))]
    async fn update_key_credentials(
        &self,
        object_id: &str,
        credentials: Vec<KeyCredential>,
    ) -> GraphResult<()> {
        let body = KeyCredentialList::from(credentials);
        self.send(
            Method::PATCH,
            &["applications", object_id, "keyCredentials"],
            Some(&body),
        )
        .await?;
        debug!("Updated key credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_includes_tenant_and_api_version() {
        let client = GraphClient::new(
            GraphConfig::new("tenant-1", "token").with_endpoint("https://graph.windows.net/"),
        )
        .unwrap();

        assert_eq!(
            client
                .url(&["applications", "app-1", "keyCredentials"])
                .unwrap()
                .as_str(),
            "https://graph.windows.net/tenant-1/applications/app-1/keyCredentials?api-version=1.6"
        );
    }

    #[test]
    fn test_url_encodes_reserved_characters() {
        let client = GraphClient::new(
            GraphConfig::new("tenant-1", "token").with_endpoint("https://graph.windows.net"),
        )
        .unwrap();

        let url = client
            .url(&["applications", "app#frag?x=1", "keyCredentials"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://graph.windows.net/tenant-1/applications/app%23frag%3Fx=1/keyCredentials?api-version=1.6"
        );
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("api-version=1.6"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = GraphClient::new(GraphConfig::new("", "token")).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_omits_token() {
        let client = GraphClient::new(GraphConfig::new("tenant-1", "secret-token")).unwrap();
        assert!(!format!("{client:?}").contains("secret-token"));
    }
}
