//! # HTTP Transport
//!
//! reqwest-backed [`Transport`]. Paths are resolved against the configured
//! base URL and the session token, when present, is sent as a bearer token.
//!
//! ```text
//! ApiRequest { GET, "/cart/qty" }
//!        │
//!        ├── base_url.join("cart/qty")      http://host/api/cart/qty
//!        ├── session.get(token_key)         Authorization: Bearer <token>
//!        ▼
//!   reqwest::Client ──► ApiResponse { status, body }
//!                         empty body    → Null
//!                         non-JSON body → String
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::session::SessionStorage;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Transport that talks to the real API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStorage>,
    token_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStorage>) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(HttpTransport {
            client,
            base_url: config.base_url()?,
            session,
            token_key: config.token_key().to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a request path.
    ///
    /// The leading `/` is dropped so the join stays under the base path.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let url = self.endpoint(&request.path)?;
        debug!(method = %request.method, %url, "Sending API request");

        let mut builder = self.client.request(request.method.into(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.session.get(&self.token_key) {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        trace!(status, "API response received");
        Ok(ApiResponse { status, body })
    }
}
