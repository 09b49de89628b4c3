//! # Cart Store
//!
//! The signed-in user's server-side cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Action            Operation            Request           Merge      │
//! │  ─────────            ─────────            ───────           ─────      │
//! │                                                                         │
//! │  Add to cart ───────► add_to_cart() ─────► POST /cart ─────► count      │
//! │                                                    (+ toast)            │
//! │  Open cart ─────────► get_cart_list() ───► GET /cart ──────► items,     │
//! │                                                              total      │
//! │  Remove line ───────► delete_cart_item() ► DELETE /cart/id ► count      │
//! │                                             └─► get_cart_list()         │
//! │  Change quantity ───► update_qty() ──────► PUT /cart/id ───► (nothing)  │
//! │                                             └─► get_cart_list()         │
//! │  Order placed ──────► get_cart_qty() ────► GET /cart/qty ──► count      │
//! │  Logged out ────────► initial_cart() ────► (none) ─────────► count = 0  │
//! │                                                                         │
//! │  Every request must answer exactly 200 to count as success.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use storefront_client::{ApiRequest, ClientError, Transport};
use storefront_core::validation::validate_quantity;
use storefront_core::{cart_total, AddToCart, CartItem, Money, QtyUpdate};

use crate::error::{StoreError, StoreResult};
use crate::lifecycle::{dispatch, Loadable, Operation, Slice};
use crate::notification::{Notifier, Toast};

const ITEM_ADDED_MESSAGE: &str = "Item added to cart";

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub items: Vec<CartItem>,

    /// Badge count shown in the navigation bar.
    pub item_count: u32,

    /// Sum of `price × qty`, recomputed whenever `items` is replaced.
    pub total_price: Money,

    pub loading: bool,

    /// Last rejection reason, empty when the last operation succeeded.
    pub error: String,
}

impl Loadable for CartState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

fn record_error(state: &mut CartState, reason: &str) {
    state.error = reason.to_string();
}

// =============================================================================
// Store
// =============================================================================

#[derive(Clone)]
pub struct CartStore {
    state: Slice<CartState>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        CartStore {
            state: Slice::new(CartState::default()),
            transport,
            notifier,
        }
    }

    pub fn snapshot(&self) -> CartState {
        self.state.snapshot()
    }

    /// Adds one unit of `product_id` in `size`.
    ///
    /// Shows a success toast, or an error toast carrying the reason.
    pub fn add_to_cart(&self, product_id: &str, size: &str) -> Operation<u32> {
        let store = self.clone();
        let body = AddToCart::single(product_id, size);

        let work = async move {
            let result = store.post_item(body).await;
            match &result {
                Ok(_) => store.notifier.notify(Toast::success(ITEM_ADDED_MESSAGE)),
                Err(err) => store.notifier.notify(Toast::error(err.to_string())),
            }
            result
        };

        dispatch(
            &self.state,
            "cart/addToCart",
            work,
            |state, count| {
                state.error.clear();
                state.item_count = *count;
            },
            record_error,
        )
    }

    /// Replaces the item list and recomputes the total.
    pub fn get_cart_list(&self) -> Operation<Vec<CartItem>> {
        let store = self.clone();

        dispatch(
            &self.state,
            "cart/getCartList",
            async move { store.fetch_items().await },
            |state, items| {
                state.error.clear();
                state.items = items.clone();
                state.total_price = cart_total(items).unwrap_or_default();
            },
            record_error,
        )
    }

    /// Removes a cart line, then refreshes the list.
    pub fn delete_cart_item(&self, id: &str) -> Operation<u32> {
        let store = self.clone();
        let id = id.to_string();

        let work = async move {
            let count = store.delete_item(&id).await?;
            store.get_cart_list();
            Ok::<_, StoreError>(count)
        };

        dispatch(
            &self.state,
            "cart/deleteCartItem",
            work,
            |state, count| {
                state.error.clear();
                state.item_count = *count;
            },
            record_error,
        )
    }

    /// Sets a line's quantity, then refreshes the list.
    ///
    /// The response payload is not merged; the refreshed list carries it.
    pub fn update_qty(&self, id: &str, qty: u32) -> Operation<()> {
        let store = self.clone();
        let id = id.to_string();

        let work = async move {
            store.put_qty(&id, qty).await?;
            store.get_cart_list();
            Ok::<_, StoreError>(())
        };

        dispatch(
            &self.state,
            "cart/updateQty",
            work,
            |state, _| state.error.clear(),
            record_error,
        )
    }

    /// Re-reads the badge count from the server.
    pub fn get_cart_qty(&self) -> Operation<u32> {
        let store = self.clone();

        dispatch(
            &self.state,
            "cart/getCartQty",
            async move { store.fetch_qty().await },
            |state, count| {
                state.error.clear();
                state.item_count = *count;
            },
            record_error,
        )
    }

    /// Resets the badge count without contacting the server.
    pub fn initial_cart(&self) {
        self.state.update(|state| state.item_count = 0);
    }

    // =========================================================================
    // Requests
    // =========================================================================

    async fn post_item(&self, body: AddToCart) -> StoreResult<u32> {
        let request = ApiRequest::post("/cart", &body)?;
        let response = self.transport.send(request).await?.ensure_status(200)?;
        let count: u32 = response.field("cartItemQty")?;
        info!(product_id = %body.product_id, size = %body.size, count, "Item added to cart");
        Ok(count)
    }

    async fn fetch_items(&self) -> StoreResult<Vec<CartItem>> {
        let response = self
            .transport
            .send(ApiRequest::get("/cart"))
            .await?
            .ensure_status(200)?;
        let items: Vec<CartItem> = response.field("data")?;

        if cart_total(&items).is_none() {
            return Err(ClientError::Decode("cart total out of range".to_string()).into());
        }
        Ok(items)
    }

    async fn delete_item(&self, id: &str) -> StoreResult<u32> {
        let response = self
            .transport
            .send(ApiRequest::delete(format!("/cart/{}", id)))
            .await?
            .ensure_status(200)?;
        info!(cart_item_id = %id, "Cart item removed");
        Ok(response.field("cartItemQty")?)
    }

    async fn put_qty(&self, id: &str, qty: u32) -> StoreResult<()> {
        validate_quantity(qty)?;
        let request = ApiRequest::put(format!("/cart/{}", id), &QtyUpdate { qty })?;
        self.transport.send(request).await?.ensure_status(200)?;
        info!(cart_item_id = %id, qty, "Cart quantity updated");
        Ok(())
    }

    async fn fetch_qty(&self) -> StoreResult<u32> {
        let response = self
            .transport
            .send(ApiRequest::get("/cart/qty"))
            .await?
            .ensure_status(200)?;
        Ok(response.field("qty")?)
    }
}
