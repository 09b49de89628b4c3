//! # Product Store
//!
//! Catalog browsing for shoppers and product management for admins.
//!
//! ## Pagination
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Product List Paging                               │
//! │                                                                         │
//! │  get_product_list({ page: 2, itemsPerPage: 20 })                        │
//! │        │                                                                │
//! │        ▼  itemsPerPage omitted? use state.items_per_page                │
//! │  GET /product?page=2&itemsPerPage=20                                    │
//! │        │                                                                │
//! │        ▼  { data: [...], totalPageNum: 5 }                              │
//! │  products      ← data                                                   │
//! │  total_pages   ← totalPageNum          (server)                         │
//! │  current_page  ← 2                     (request echo)                   │
//! │  items_per_page← 20                    (request echo, else unchanged)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutations
//! `create_product`, `edit_product` and `delete_product` toast on success
//! and refetch the list: page 1 after a create, the current page otherwise.
//! `success` tells the edit dialog it may close.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use storefront_client::{ApiRequest, Transport};
use storefront_core::validation::{
    validate_items_per_page, validate_page, validate_product_form, ValidationResult,
};
use storefront_core::{Product, ProductForm, ProductQuery, DEFAULT_ITEMS_PER_PAGE};

use crate::error::{StoreError, StoreResult};
use crate::lifecycle::{dispatch, Loadable, Operation, Slice};
use crate::notification::{Notifier, Toast};

const CREATED_MESSAGE: &str = "Product created";
const UPDATED_MESSAGE: &str = "Product updated";
const DELETED_MESSAGE: &str = "Product deleted";

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductState {
    pub products: Vec<Product>,
    pub selected_product: Option<Product>,
    pub items_per_page: u32,
    pub current_page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub error: String,

    /// Set when a mutation or detail fetch succeeds; the admin dialog closes
    /// on it.
    pub success: bool,
}

impl ProductState {
    pub fn new(items_per_page: u32) -> Self {
        ProductState {
            products: Vec::new(),
            selected_product: None,
            items_per_page,
            current_page: 1,
            total_pages: 1,
            loading: false,
            error: String::new(),
            success: false,
        }
    }
}

impl Default for ProductState {
    fn default() -> Self {
        ProductState::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl Loadable for ProductState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

fn record_failure(state: &mut ProductState, reason: &str) {
    state.error = reason.to_string();
    state.success = false;
}

fn record_success(state: &mut ProductState, _: &()) {
    state.error.clear();
    state.success = true;
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u32,
}

// =============================================================================
// Store
// =============================================================================

#[derive(Clone)]
pub struct ProductStore {
    state: Slice<ProductState>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
}

impl ProductStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        items_per_page: u32,
    ) -> Self {
        ProductStore {
            state: Slice::new(ProductState::new(items_per_page)),
            transport,
            notifier,
        }
    }

    pub fn snapshot(&self) -> ProductState {
        self.state.snapshot()
    }

    // =========================================================================
    // Async Operations
    // =========================================================================

    pub fn get_product_list(&self, query: ProductQuery) -> Operation<ProductPage> {
        let store = self.clone();
        let page = query.page;
        let requested_per_page = query.items_per_page;
        let outgoing = ProductQuery {
            items_per_page: Some(
                requested_per_page.unwrap_or_else(|| self.state.read(|s| s.items_per_page)),
            ),
            ..query
        };

        dispatch(
            &self.state,
            "products/getProductList",
            async move { store.fetch_products(&outgoing).await },
            move |state, result| {
                state.error.clear();
                state.products = result.products.clone();
                state.total_pages = result.total_pages;
                state.current_page = page;
                state.items_per_page = requested_per_page.unwrap_or(state.items_per_page);
            },
            record_failure,
        )
    }

    pub fn get_product_detail(&self, id: &str) -> Operation<Product> {
        let store = self.clone();
        let id = id.to_string();

        dispatch(
            &self.state,
            "products/getProductDetail",
            async move { store.fetch_product(&id).await },
            |state, product| {
                state.error.clear();
                state.success = true;
                state.selected_product = Some(product.clone());
            },
            record_failure,
        )
    }

    /// Creates a product, then shows page 1 of the list.
    ///
    /// A duplicate SKU rejects with "identifier already exists".
    pub fn create_product(&self, form: ProductForm) -> Operation<()> {
        let store = self.clone();

        let work = async move {
            store
                .post_product(&form)
                .await
                .map_err(StoreError::translate_duplicate)?;
            store.notifier.notify(Toast::success(CREATED_MESSAGE));

            let items_per_page = store.state.read(|s| s.items_per_page);
            store.get_product_list(ProductQuery::page(1).with_items_per_page(items_per_page));
            Ok::<_, StoreError>(())
        };

        dispatch(
            &self.state,
            "products/createProduct",
            work,
            |state, created| {
                record_success(state, created);
                state.current_page = 1;
            },
            record_failure,
        )
    }

    /// Updates a product, then refreshes the current page.
    pub fn edit_product(&self, id: &str, form: ProductForm) -> Operation<()> {
        let store = self.clone();
        let id = id.to_string();

        let work = async move {
            store.put_product(&id, &form).await?;
            store.notifier.notify(Toast::success(UPDATED_MESSAGE));
            store.refresh_current_page();
            Ok::<_, StoreError>(())
        };

        dispatch(
            &self.state,
            "products/editProduct",
            work,
            record_success,
            record_failure,
        )
    }

    /// Deletes a product, then refreshes the current page.
    pub fn delete_product(&self, id: &str) -> Operation<()> {
        let store = self.clone();
        let id = id.to_string();

        let work = async move {
            store.remove_product(&id).await?;
            store.notifier.notify(Toast::success(DELETED_MESSAGE));
            store.refresh_current_page();
            Ok::<_, StoreError>(())
        };

        dispatch(
            &self.state,
            "products/deleteProduct",
            work,
            record_success,
            record_failure,
        )
    }

    // =========================================================================
    // Synchronous Actions
    // =========================================================================

    pub fn select_product(&self, product: Option<Product>) {
        self.state.update(|state| state.selected_product = product);
    }

    /// Clears `error` and `success`, e.g. when the edit dialog reopens.
    pub fn clear_error(&self) {
        self.state.update(|state| {
            state.error.clear();
            state.success = false;
        });
    }

    /// Sets the page size used by the next list fetch.
    pub fn set_items_per_page(&self, items_per_page: u32) -> ValidationResult<()> {
        validate_items_per_page(items_per_page)?;
        self.state.update(|state| state.items_per_page = items_per_page);
        Ok(())
    }

    pub fn set_current_page(&self, page: u32) -> ValidationResult<()> {
        validate_page(page)?;
        self.state.update(|state| state.current_page = page);
        Ok(())
    }

    // =========================================================================
    // Requests
    // =========================================================================

    fn refresh_current_page(&self) {
        let (page, items_per_page) = self.state.read(|s| (s.current_page, s.items_per_page));
        self.get_product_list(ProductQuery::page(page).with_items_per_page(items_per_page));
    }

    async fn fetch_products(&self, query: &ProductQuery) -> StoreResult<ProductPage> {
        validate_page(query.page)?;
        let request = ApiRequest::get("/product").with_query(query)?;
        let response = self.transport.send(request).await?.ensure_success()?;
        Ok(ProductPage {
            products: response.field("data")?,
            total_pages: response.field("totalPageNum")?,
        })
    }

    async fn fetch_product(&self, id: &str) -> StoreResult<Product> {
        let response = self
            .transport
            .send(ApiRequest::get(format!("/product/{}", id)))
            .await?
            .ensure_success()?;
        Ok(response.field("data")?)
    }

    async fn post_product(&self, form: &ProductForm) -> StoreResult<()> {
        validate_product_form(form)?;
        let request = ApiRequest::post("/product", form)?;
        self.transport.send(request).await?.ensure_success()?;
        info!(sku = %form.sku, "Product created");
        Ok(())
    }

    async fn put_product(&self, id: &str, form: &ProductForm) -> StoreResult<()> {
        validate_product_form(form)?;
        let request = ApiRequest::put(format!("/product/{}", id), form)?;
        self.transport.send(request).await?.ensure_success()?;
        info!(product_id = %id, sku = %form.sku, "Product updated");
        Ok(())
    }

    async fn remove_product(&self, id: &str) -> StoreResult<()> {
        self.transport
            .send(ApiRequest::delete(format!("/product/{}", id)))
            .await?
            .ensure_success()?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::{json, Value};
    use storefront_client::{Method, MockTransport};
    use storefront_core::Money;
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::lifecycle::AsyncState;
    use crate::notification::{ChannelNotifier, ToastLevel};
    use crate::test_support::{eventually, product_json};

    fn store() -> (ProductStore, Arc<MockTransport>, UnboundedReceiver<Toast>) {
        let mock = Arc::new(MockTransport::new());
        let (notifier, toasts) = ChannelNotifier::new();
        let products = ProductStore::new(mock.clone(), Arc::new(notifier), DEFAULT_ITEMS_PER_PAGE);
        (products, mock, toasts)
    }

    fn page_json(ids: &[&str], total_pages: u32) -> Value {
        let data: Vec<Value> = ids.iter().map(|id| product_json(id, 10)).collect();
        json!({ "status": "success", "data": data, "totalPageNum": total_pages })
    }

    fn form(sku: &str) -> ProductForm {
        ProductForm {
            sku: sku.to_string(),
            name: "Basic Tee".to_string(),
            size: vec!["m".to_string()],
            price: Money::from_major(15),
            ..ProductForm::default()
        }
    }

    #[tokio::test]
    async fn test_list_echoes_query_and_server_pages() {
        let (products, mock, _toasts) = store();
        mock.respond(Method::Get, "/product", 200, page_json(&["a", "b"], 5));

        products
            .get_product_list(ProductQuery::page(2).with_items_per_page(20))
            .into_result()
            .await
            .unwrap();

        let state = products.snapshot();
        assert_eq!(state.current_page, 2);
        assert_eq!(state.items_per_page, 20);
        assert_eq!(state.total_pages, 5);
        assert_eq!(state.products.len(), 2);
        assert!(!state.loading);
        assert_eq!(state.error, "");

        let request = mock.last(Method::Get, "/product").unwrap();
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("itemsPerPage"), Some("20"));
    }

    #[tokio::test]
    async fn test_list_falls_back_to_state_page_size() {
        let (products, mock, _toasts) = store();
        mock.respond(Method::Get, "/product", 200, page_json(&["a"], 1));
        products.set_items_per_page(10).unwrap();

        products
            .get_product_list(ProductQuery::page(1).with_name("tee"))
            .into_result()
            .await
            .unwrap();

        let request = mock.last(Method::Get, "/product").unwrap();
        assert_eq!(request.query_param("itemsPerPage"), Some("10"));
        assert_eq!(request.query_param("name"), Some("tee"));
        assert_eq!(products.snapshot().items_per_page, 10);
    }

    #[tokio::test]
    async fn test_racing_lists_last_completion_wins() {
        let (products, mock, _toasts) = store();
        mock.respond_after(
            Method::Get,
            "/product",
            Duration::from_millis(60),
            200,
            page_json(&["slow"], 1),
        );
        mock.respond(Method::Get, "/product", 200, page_json(&["fast-1", "fast-2"], 2));

        let first = products.get_product_list(ProductQuery::page(1));
        let second = products.get_product_list(ProductQuery::page(2));

        first.into_result().await.unwrap();
        second.into_result().await.unwrap();

        let state = products.snapshot();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.products[0].id, "slow");
        assert_eq!(state.total_pages, 1);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_list_rejection_clears_success() {
        let (products, mock, mut toasts) = store();
        mock.respond(Method::Get, "/product/p1", 200, json!({ "data": product_json("p1", 10) }));
        mock.fail(Method::Get, "/product", "connection refused");

        products.get_product_detail("p1").into_result().await.unwrap();
        assert!(products.snapshot().success);

        let mut op = products.get_product_list(ProductQuery::page(1));
        assert_eq!(op.settled().await, AsyncState::Rejected("connection refused".into()));

        let state = products.snapshot();
        assert_eq!(state.error, "connection refused");
        assert!(!state.success);
        assert!(toasts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_get_product_detail_selects_product() {
        let (products, mock, _toasts) = store();
        mock.respond(Method::Get, "/product/p1", 200, json!({ "data": product_json("p1", 10) }));

        let product = products.get_product_detail("p1").into_result().await.unwrap();
        assert_eq!(product.id, "p1");

        let state = products.snapshot();
        assert_eq!(state.selected_product.map(|p| p.id), Some("p1".to_string()));
        assert!(state.success);
    }

    #[tokio::test]
    async fn test_create_duplicate_sku_is_translated() {
        let (products, mock, mut toasts) = store();
        mock.respond(
            Method::Post,
            "/product",
            400,
            json!({ "status": "fail", "message": "E11000 duplicate key error collection: products index: sku_1 dup key" }),
        );

        let err = products.create_product(form("TEE-001")).into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "identifier already exists");

        let state = products.snapshot();
        assert_eq!(state.error, "identifier already exists");
        assert!(!state.success);
        assert!(toasts.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mock.count(Method::Get, "/product"), 0);
    }

    #[tokio::test]
    async fn test_create_refetches_first_page() {
        let (products, mock, mut toasts) = store();
        mock.respond(Method::Post, "/product", 200, json!({ "status": "success", "data": product_json("new", 15) }));
        mock.respond(Method::Get, "/product", 200, page_json(&["new"], 1));
        products.set_items_per_page(20).unwrap();
        products.set_current_page(3).unwrap();

        products.create_product(form("TEE-001")).into_result().await.unwrap();

        let state = products.snapshot();
        assert!(state.success);
        assert_eq!(state.current_page, 1);

        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.level, ToastLevel::Success);
        assert_eq!(toast.message, "Product created");

        eventually(|| mock.count(Method::Get, "/product") == 1).await;
        let request = mock.last(Method::Get, "/product").unwrap();
        assert_eq!(request.query_param("page"), Some("1"));
        assert_eq!(request.query_param("itemsPerPage"), Some("20"));

        eventually(|| products.snapshot().products.len() == 1).await;
    }

    #[tokio::test]
    async fn test_create_invalid_form_sends_nothing() {
        let (products, mock, _toasts) = store();

        let err = products.create_product(form("")).into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "sku is required");
        assert!(mock.requests().is_empty());
        assert!(!products.snapshot().success);
    }

    #[tokio::test]
    async fn test_edit_refetches_current_page() {
        let (products, mock, mut toasts) = store();
        mock.respond(Method::Put, "/product/p1", 200, json!({ "status": "success" }));
        mock.respond(Method::Get, "/product", 200, page_json(&["p1"], 4));
        products.set_current_page(2).unwrap();

        products.edit_product("p1", form("TEE-001")).into_result().await.unwrap();
        assert!(products.snapshot().success);
        assert_eq!(toasts.try_recv().unwrap().message, "Product updated");

        eventually(|| mock.count(Method::Get, "/product") == 1).await;
        let request = mock.last(Method::Get, "/product").unwrap();
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("itemsPerPage"), Some("5"));

        let sent = mock.last(Method::Put, "/product/p1").unwrap().body.unwrap();
        assert_eq!(sent["sku"], "TEE-001");
    }

    #[tokio::test]
    async fn test_delete_toasts_and_refetches() {
        let (products, mock, mut toasts) = store();
        mock.respond(Method::Delete, "/product/p1", 200, json!({ "status": "success" }));
        mock.respond(Method::Get, "/product", 200, page_json(&[], 1));

        products.delete_product("p1").into_result().await.unwrap();
        assert!(products.snapshot().success);
        assert_eq!(toasts.try_recv().unwrap().message, "Product deleted");

        eventually(|| mock.count(Method::Get, "/product") == 1).await;
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_raw_message() {
        let (products, mock, _toasts) = store();
        mock.respond(Method::Delete, "/product/p1", 403, json!({ "message": "E11000 is not a delete error" }));

        let err = products.delete_product("p1").into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "E11000 is not a delete error");
    }

    #[test]
    fn test_synchronous_actions() {
        let (products, _mock, _toasts) = store();

        assert!(products.set_items_per_page(7).is_err());
        assert_eq!(products.snapshot().items_per_page, DEFAULT_ITEMS_PER_PAGE);
        products.set_items_per_page(50).unwrap();
        assert_eq!(products.snapshot().items_per_page, 50);

        assert!(products.set_current_page(0).is_err());
        products.set_current_page(4).unwrap();
        assert_eq!(products.snapshot().current_page, 4);

        let product: Product = serde_json::from_value(product_json("p9", 10)).unwrap();
        products.select_product(Some(product));
        assert!(products.snapshot().selected_product.is_some());

        products.state.update(|s| {
            s.error = "boom".into();
            s.success = true;
        });
        products.clear_error();
        let state = products.snapshot();
        assert_eq!(state.error, "");
        assert!(!state.success);
    }
}
