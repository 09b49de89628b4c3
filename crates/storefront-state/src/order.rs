//! # Order Store
//!
//! Checkout and order history.
//!
//! ```text
//! create_order(form) ──► POST /order ──► order_num
//!                                    └─► StoreEvent::OrderCreated
//!                                          (cart badge refresh)
//! get_order_list(q)  ──► GET /order?page&ordernum ──► orders, total_pages
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use storefront_client::{ApiRequest, Transport};
use storefront_core::{Order, OrderForm, OrderQuery};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};
use crate::lifecycle::{dispatch, Loadable, Operation, Slice};
use crate::notification::{Notifier, Toast};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub orders: Vec<Order>,

    /// Confirmation number of the last order placed.
    pub order_num: String,

    pub selected_order: Option<Order>,
    pub total_pages: u32,
    pub loading: bool,
    pub error: String,
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState {
            orders: Vec::new(),
            order_num: String::new(),
            selected_order: None,
            total_pages: 1,
            loading: false,
            error: String::new(),
        }
    }
}

impl Loadable for OrderState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

fn record_error(state: &mut OrderState, reason: &str) {
    state.error = reason.to_string();
}

/// One page of order history.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total_pages: u32,
}

#[derive(Clone)]
pub struct OrderStore {
    state: Slice<OrderState>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    events: EventBus,
}

impl OrderStore {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>, events: EventBus) -> Self {
        OrderStore {
            state: Slice::new(OrderState::default()),
            transport,
            notifier,
            events,
        }
    }

    pub fn snapshot(&self) -> OrderState {
        self.state.snapshot()
    }

    /// Places an order. Publishes [`StoreEvent::OrderCreated`] on success and
    /// shows an error toast on failure.
    pub fn create_order(&self, form: OrderForm) -> Operation<String> {
        let store = self.clone();

        let work = async move {
            let result = store.post_order(&form).await;
            match &result {
                Ok(order_num) => store.events.publish(StoreEvent::OrderCreated {
                    order_num: order_num.clone(),
                }),
                Err(err) => store.notifier.notify(Toast::error(err.to_string())),
            }
            result
        };

        dispatch(
            &self.state,
            "order/createOrder",
            work,
            |state, order_num| {
                state.error.clear();
                state.order_num = order_num.clone();
            },
            record_error,
        )
    }

    pub fn get_order_list(&self, query: OrderQuery) -> Operation<OrderPage> {
        let store = self.clone();

        dispatch(
            &self.state,
            "order/getOrderList",
            async move { store.fetch_orders(&query).await },
            |state, page| {
                state.error.clear();
                state.orders = page.orders.clone();
                state.total_pages = page.total_pages;
            },
            record_error,
        )
    }

    pub fn set_selected_order(&self, order: Option<Order>) {
        self.state.update(|state| state.selected_order = order);
    }

    async fn post_order(&self, form: &OrderForm) -> StoreResult<String> {
        let request = ApiRequest::post("/order", form)?;
        let response = self.transport.send(request).await?.ensure_status(200)?;
        let order_num: String = response.field("orderNum")?;
        info!(%order_num, total = %form.total_price, lines = form.order_list.len(), "Order created");
        Ok(order_num)
    }

    async fn fetch_orders(&self, query: &OrderQuery) -> StoreResult<OrderPage> {
        let request = ApiRequest::get("/order").with_query(query)?;
        let response = self.transport.send(request).await?.ensure_status(200)?;
        Ok(OrderPage {
            orders: response.field("data")?,
            total_pages: response.field("totalPageNum")?,
        })
    }
}
