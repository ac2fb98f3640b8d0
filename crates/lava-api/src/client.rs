//! HTTP transport for the Lava API.
//!
//! [`LavaClient`] owns the base URL, tenant, and auth token and exposes the
//! verb-shaped methods the resource handlers build on. Responses come back
//! as raw `serde_json::Value`; the schema engine does the typing one layer
//! up.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://dfw.bigdata.api.rackspacecloud.com/v2";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the Lava REST API. Cheap to clone; handlers share one.
#[derive(Debug, Clone)]
pub struct LavaClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Builder for [`LavaClient`].
///
/// ```no_run
/// use lava_api::LavaClient;
///
/// # fn main() -> lava_api::Result<()> {
/// let client = LavaClient::builder()
///     .api_url("https://dfw.bigdata.api.rackspacecloud.com/v2")
///     .tenant("123456")
///     .token("0123456789abcdef")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct LavaClientBuilder {
    api_url: Option<String>,
    tenant: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
    client: Option<reqwest::Client>,
}

impl LavaClientBuilder {
    /// Base API endpoint, without the tenant segment.
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Tenant id, appended as the first path segment under the base URL.
    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Auth token, sent as `X-Auth-Token` on every request.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Request timeout in seconds. Ignored when a custom client is injected.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Inject a pre-configured `reqwest::Client` (used by tests).
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<LavaClient> {
        let api_url = self
            .api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let parsed = url::Url::parse(&api_url)
            .map_err(|e| Error::InvalidUrl(format!("{api_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidUrl(api_url));
        }

        let mut base_url = api_url.trim_end_matches('/').to_string();
        if let Some(tenant) = &self.tenant {
            base_url.push('/');
            base_url.push_str(tenant);
        }

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(concat!("lavactl/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(
                    self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                ))
                .build()?,
        };

        Ok(LavaClient {
            client,
            base_url,
            token: self.token,
        })
    }
}

impl LavaClient {
    #[must_use]
    pub fn builder() -> LavaClientBuilder {
        LavaClientBuilder::default()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, &[], None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "lava api request");

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.header("X-Auth-Token", token);
        }
        if let Some(body) = body {
            trace!(body = %body, "request body");
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!(%status, body = %text, "lava api response");

        if !status.is_success() {
            return Err(Error::Api {
                code: status.as_u16(),
                message: extract_error_message(&text, status),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| Error::Api {
            code: status.as_u16(),
            message: format!("invalid JSON in response body: {e}"),
        })
    }
}

/// Pull out the envelope under `key`, failing loudly when the response
/// shape is not what the endpoint documents.
pub fn expect_wrapper(value: Value, key: &'static str) -> Result<Value> {
    match value {
        Value::Object(mut map) => map.remove(key).ok_or(Error::MissingWrapper(key)),
        _ => Err(Error::MissingWrapper(key)),
    }
}

fn extract_error_message(body: &str, status: StatusCode) -> String {
    // Error bodies look like {"badRequest": {"message": "...", "code": 400}};
    // fall back to the raw body, then the status reason.
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for inner in map.values() {
            if let Some(message) = inner.get("message").and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
