//! # App Store
//!
//! Owns the four stores, the collaborators they share, and the event wiring
//! between them. Created once at startup and kept for the life of the
//! process.
//!
//! ## Event Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cross-Store Reactions                            │
//! │                                                                         │
//! │  Event                       Reaction                                   │
//! │  ─────                       ────────                                   │
//! │  OrderCreated { order_num }  cart.get_cart_qty()   (server emptied cart)│
//! │  LoggedOut                   cart.initial_cart()   (badge back to 0)    │
//! │                                                                         │
//! │  The wiring task is aborted when the AppStore is dropped.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use storefront_client::{ClientConfig, HttpTransport, MemorySessionStorage, SessionStorage, Transport};

use crate::cart::{CartState, CartStore};
use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};
use crate::navigation::Navigator;
use crate::notification::Notifier;
use crate::order::{OrderState, OrderStore};
use crate::product::{ProductState, ProductStore};
use crate::user::{UserState, UserStore};

/// External collaborators shared by every store.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub session: Arc<dyn SessionStorage>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

/// Point-in-time copy of every store's state, as handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub cart: CartState,
    pub order: OrderState,
    pub product: ProductState,
    pub user: UserState,
}

pub struct AppStore {
    cart: CartStore,
    order: OrderStore,
    product: ProductStore,
    user: UserStore,
    events: EventBus,
    wiring: JoinHandle<()>,
}

impl AppStore {
    /// Builds the stores around the given collaborators.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(config: &ClientConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            transport,
            session,
            notifier,
            navigator,
        } = collaborators;
        let events = EventBus::new();

        let cart = CartStore::new(transport.clone(), notifier.clone());
        let order = OrderStore::new(transport.clone(), notifier.clone(), events.clone());
        let product = ProductStore::new(
            transport.clone(),
            notifier.clone(),
            config.catalog.items_per_page,
        );
        let user = UserStore::new(
            transport,
            session,
            config.token_key(),
            notifier,
            navigator,
            events.clone(),
        );

        let wiring = spawn_wiring(events.subscribe(), cart.clone());
        info!(
            items_per_page = config.catalog.items_per_page,
            "Storefront stores initialized"
        );

        AppStore {
            cart,
            order,
            product,
            user,
            events,
            wiring,
        }
    }

    /// Builds the stores against the real API with in-memory session storage.
    pub fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> StoreResult<Self> {
        let session: Arc<dyn SessionStorage> = Arc::new(MemorySessionStorage::new());
        let transport = HttpTransport::new(config, session.clone())?;

        Ok(Self::new(
            config,
            Collaborators {
                transport: Arc::new(transport),
                session,
                notifier,
                navigator,
            },
        ))
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn order(&self) -> &OrderStore {
        &self.order
    }

    pub fn product(&self) -> &ProductStore {
        &self.product
    }

    pub fn user(&self) -> &UserStore {
        &self.user
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            cart: self.cart.snapshot(),
            order: self.order.snapshot(),
            product: self.product.snapshot(),
            user: self.user.snapshot(),
        }
    }
}

impl Drop for AppStore {
    fn drop(&mut self) {
        self.wiring.abort();
    }
}

fn spawn_wiring(mut rx: broadcast::Receiver<StoreEvent>, cart: CartStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(StoreEvent::OrderCreated { order_num }) => {
                    debug!(%order_num, "Order created, refreshing cart count");
                    cart.get_cart_qty();
                }
                Ok(StoreEvent::LoggedOut) => {
                    debug!("Logged out, resetting cart count");
                    cart.initial_cart();
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Store event receiver lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
