//! # storefront-state: Client-Side Stores for the Storefront
//!
//! Four independent stores kept in sync with the storefront API, plus the
//! aggregator that owns them.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppStore                                       │
//! │                                                                         │
//! │  ┌────────────┐  ┌────────────┐  ┌──────────────┐  ┌────────────┐       │
//! │  │ CartStore  │  │ OrderStore │  │ ProductStore │  │ UserStore  │       │
//! │  └─────┬──────┘  └─────┬──────┘  └──────┬───────┘  └─────┬──────┘       │
//! │        │               │ OrderCreated   │                │ LoggedOut    │
//! │        │◄──────────────┴──── EventBus ──┼────────────────┘              │
//! │        │                                │                               │
//! │        └──────────────┬─────────────────┴───────────────┐               │
//! │                       ▼                                 ▼               │
//! │               dyn Transport                 dyn Notifier / Navigator    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every asynchronous operation returns an [`Operation`] handle right away
//! and runs on the tokio runtime; see [`lifecycle`] for the phases.
//!
//! ## Modules
//!
//! - [`lifecycle`] - `AsyncState`, `Operation`, `Slice`
//! - [`cart`], [`order`], [`product`], [`user`] - the stores
//! - [`events`] - cross-store event bus
//! - [`notification`], [`navigation`] - UI-facing collaborators
//! - [`app`] - `AppStore` aggregator

pub mod app;
pub mod cart;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod navigation;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use app::{AppSnapshot, AppStore, Collaborators};
pub use cart::{CartState, CartStore};
pub use error::{StoreError, StoreResult};
pub use events::{EventBus, StoreEvent};
pub use lifecycle::{AsyncState, Operation};
pub use navigation::{ChannelNavigator, Navigator, NoOpNavigator};
pub use notification::{ChannelNotifier, Notifier, Toast, ToastLevel, TracingNotifier};
pub use order::{OrderPage, OrderState, OrderStore};
pub use product::{ProductPage, ProductState, ProductStore};
pub use user::{UserState, UserStore};
