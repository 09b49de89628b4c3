//! # Mock Transport
//!
//! A scripted [`Transport`] for exercising the stores without a server.
//!
//! ## Scripting Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       MockTransport                                     │
//! │                                                                         │
//! │  (GET, "/cart") ──► [ reply 1 ] ─► [ reply 2 ] ─► [ reply 3 ]…          │
//! │                                                     ▲                   │
//! │                        the last reply is sticky ────┘                   │
//! │                                                                         │
//! │  reply = status + body | transport failure, with optional delay         │
//! │  unscripted route = ClientError::Transport                              │
//! │  every request is logged (query and body included) before it waits      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone)]
enum Reply {
    Response(ApiResponse),
    Failure(String),
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Option<Duration>,
}

/// Transport that answers from a script and records what it was sent.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, method: Method, path: &str, scripted: Scripted) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
        self
    }

    /// Queues an immediate response.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.script(
            method,
            path,
            Scripted {
                reply: Reply::Response(ApiResponse::new(status, body)),
                delay: None,
            },
        )
    }

    /// Queues a response that arrives after `delay`.
    pub fn respond_after(
        &self,
        method: Method,
        path: &str,
        delay: Duration,
        status: u16,
        body: Value,
    ) -> &Self {
        self.script(
            method,
            path,
            Scripted {
                reply: Reply::Response(ApiResponse::new(status, body)),
                delay: Some(delay),
            },
        )
    }

    /// Queues a failure where no response arrives (connection refused etc.).
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.script(
            method,
            path,
            Scripted {
                reply: Reply::Failure(message.to_string()),
                delay: None,
            },
        )
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for one route.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Most recent request for one route.
    pub fn last(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let method = request.method;
        let path = request.path.clone();

        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let scripted = self.next_reply(method, &path).ok_or_else(|| {
            ClientError::Transport(format!("no scripted reply for {} {}", method, path))
        })?;

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        match scripted.reply {
            Reply::Response(response) => Ok(response),
            Reply::Failure(message) => Err(ClientError::Transport(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replies_in_order_and_last_is_sticky() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/cart/qty", 200, json!({ "qty": 1 }))
            .respond(Method::Get, "/cart/qty", 200, json!({ "qty": 2 }));

        for expected in [1, 2, 2] {
            let response = mock.send(ApiRequest::get("/cart/qty")).await.unwrap();
            assert_eq!(response.body["qty"], json!(expected));
        }
        assert_eq!(mock.count(Method::Get, "/cart/qty"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_route_is_transport_error() {
        let mock = MockTransport::new();
        let err = mock.send(ApiRequest::get("/order")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_and_last() {
        let mock = MockTransport::new();
        mock.fail(Method::Delete, "/cart/c1", "connection reset");

        let err = mock.send(ApiRequest::delete("/cart/c1")).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert!(mock.last(Method::Delete, "/cart/c1").is_some());
        assert!(mock.last(Method::Get, "/cart/c1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_reply() {
        let mock = MockTransport::new();
        mock.respond_after(
            Method::Get,
            "/product",
            Duration::from_millis(200),
            200,
            json!({ "data": [] }),
        );

        let started = tokio::time::Instant::now();
        let response = mock.send(ApiRequest::get("/product")).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
