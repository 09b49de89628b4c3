//! # Transport
//!
//! The one seam between the stores and the network.
//!
//! ## Request/Response Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Transport Contract                                 │
//! │                                                                         │
//! │  ApiRequest                              ApiResponse                    │
//! │  ──────────                              ───────────                    │
//! │  method  GET | POST | PUT | DELETE       status  u16                    │
//! │  path    "/product/abc"          ──►     body    JSON (Null if empty)   │
//! │  query   [("page","2"), ...]                                            │
//! │  body    Option<JSON>                    Err(ClientError::Transport)    │
//! │                                          when no response arrived       │
//! │                                                                         │
//! │  A non-2xx status is NOT a transport error. The caller decides what     │
//! │  counts as success with ensure_status / ensure_success.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Method
// =============================================================================

/// HTTP methods used by the storefront API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

// =============================================================================
// Request
// =============================================================================

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn post(path: impl Into<String>, body: &impl Serialize) -> ClientResult<Self> {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: &impl Serialize) -> ClientResult<Self> {
        Self::new(Method::Put, path).with_body(body)
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: &impl Serialize) -> ClientResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Flattens a serializable struct into query parameters.
    ///
    /// Top-level fields only; `null` fields are dropped so optional filters
    /// never show up as `?name=null`.
    pub fn with_query(mut self, query: &impl Serialize) -> ClientResult<Self> {
        let value = serde_json::to_value(query).map_err(|e| ClientError::Encode(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(ClientError::Encode(
                "query parameters must serialize to an object".into(),
            ));
        };

        for (key, value) in fields {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.query.push((key, rendered));
        }
        Ok(self)
    }

    /// Value of a query parameter, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// =============================================================================
// Response
// =============================================================================

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        ApiResponse { status, body }
    }

    /// Returns true for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error text the API put in the body, if any.
    ///
    /// The API reports failures as `{ "status": "fail", "message": ... }`,
    /// older endpoints use `error` instead of `message`.
    pub fn message(&self) -> Option<&str> {
        match &self.body {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Object(map) => ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            _ => None,
        }
    }

    fn into_status_error(self) -> ClientError {
        let message = self
            .message()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Request failed with status code {}", self.status));
        ClientError::Status {
            status: self.status,
            message,
        }
    }

    /// Fails unless the status is exactly `expected`.
    pub fn ensure_status(self, expected: u16) -> ClientResult<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.into_status_error())
        }
    }

    /// Fails unless the status is 2xx.
    pub fn ensure_success(self) -> ClientResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_status_error())
        }
    }

    /// Decodes one top-level field of the body.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> ClientResult<T> {
        let value = self
            .body
            .get(name)
            .ok_or_else(|| ClientError::Decode(format!("missing field `{}`", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ClientError::Decode(format!("field `{}`: {}", name, e)))
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Issues one request and waits for the response.
///
/// Implementations attach whatever the API needs (base URL, bearer token).
/// They never retry and never time out on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Query {
        page: u32,
        name: Option<String>,
        items_per_page: Option<u32>,
    }

    #[test]
    fn test_with_query_flattens_and_drops_nulls() {
        let request = ApiRequest::get("/product")
            .with_query(&Query {
                page: 2,
                name: None,
                items_per_page: Some(20),
            })
            .unwrap();

        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("itemsPerPage"), Some("20"));
        assert_eq!(request.query_param("name"), None);
    }

    #[test]
    fn test_with_query_rejects_scalars() {
        assert!(ApiRequest::get("/product").with_query(&5).is_err());
    }

    #[test]
    fn test_post_carries_json_body() {
        let request = ApiRequest::post("/cart", &json!({ "qty": 1 })).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(json!({ "qty": 1 })));
    }

    #[test]
    fn test_ensure_status_uses_body_message() {
        let response = ApiResponse::new(400, json!({ "status": "fail", "message": "out of stock" }));
        let err = response.ensure_status(200).unwrap_err();
        assert_eq!(err.to_string(), "out of stock");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_ensure_status_is_exact() {
        let response = ApiResponse::new(201, json!({}));
        assert!(response.clone().ensure_success().is_ok());
        assert!(response.ensure_status(200).is_err());
    }

    #[test]
    fn test_status_error_falls_back_to_code() {
        let err = ApiResponse::new(502, Value::Null).ensure_success().unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn test_message_reads_error_key() {
        let response = ApiResponse::new(401, json!({ "error": "invalid token" }));
        assert_eq!(response.message(), Some("invalid token"));
    }

    #[test]
    fn test_field_decodes_and_reports_missing() {
        let response = ApiResponse::new(200, json!({ "cartItemQty": 3 }));
        assert_eq!(response.field::<u32>("cartItemQty").unwrap(), 3);

        let err = response.field::<u32>("qty").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
