//! # storefront-client: Transport Layer for the Storefront
//!
//! Everything the state layer needs from the outside world to talk to the
//! storefront API: a transport that returns a status and a JSON body, a
//! place to keep the session token, and the configuration that wires them.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Layer                                       │
//! │                                                                         │
//! │  storefront-state stores                                                │
//! │        │  ApiRequest { method, path, query, body }                      │
//! │        ▼                                                                │
//! │  ┌──────────────────────────────┐      ┌────────────────────────────┐   │
//! │  │   dyn Transport              │      │   dyn SessionStorage       │   │
//! │  │                              │      │                            │   │
//! │  │  HttpTransport (reqwest) ────┼─────►│  token read per request    │   │
//! │  │  MockTransport (tests)       │      │  MemorySessionStorage      │   │
//! │  └──────────────┬───────────────┘      └────────────────────────────┘   │
//! │                 │  ApiResponse { status, body }                         │
//! │                 ▼                                                       │
//! │        ensure_status / ensure_success / field                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`transport`] - `Transport` trait, request/response types
//! - [`http`] - reqwest-backed transport
//! - [`session`] - session token storage
//! - [`config`] - TOML + environment configuration
//! - [`mock`] - scripted transport for tests
//! - [`error`] - `ClientError`

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpTransport;
pub use mock::MockTransport;
pub use session::{MemorySessionStorage, SessionStorage};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
