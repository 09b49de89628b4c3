//! # Domain Types
//!
//! Wire types exchanged with the storefront API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (_id)       │◄──│  productId      │   │  orderNum       │       │
//! │  │  sku            │   │  size           │   │  items          │       │
//! │  │  price          │   │  qty            │   │  totalPrice     │       │
//! │  │  stock by size  │   └─────────────────┘   │  shipTo/contact │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │  ProductQuery   │   │   OrderQuery    │       │
//! │  │  email, name    │   │  page, name     │   │  page, ordernum │       │
//! │  │  level          │   │  itemsPerPage   │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! The backend is document-oriented and names primary keys `_id`; every
//! entity maps that to `id`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;

// =============================================================================
// User
// =============================================================================

/// Permission level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    #[default]
    Customer,
    Admin,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub level: UserLevel,
}

impl User {
    /// Admins see the product management screens.
    pub fn is_admin(&self) -> bool {
        self.level == UserLevel::Admin
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

// =============================================================================
// Product
// =============================================================================

/// Whether a product is shown in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,

    /// Stock Keeping Unit, unique across the catalog.
    pub sku: String,

    pub name: String,

    /// Sizes the product is sold in (e.g. `["s", "m", "l"]`).
    #[serde(default)]
    pub size: Vec<String>,

    /// Image URL.
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub category: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[ts(type = "number")]
    pub price: Money,

    /// Units on hand per size.
    #[serde(default)]
    pub stock: HashMap<String, u32>,

    #[serde(default)]
    pub status: ProductStatus,

    #[serde(default)]
    pub is_deleted: bool,
}

impl Product {
    /// Units on hand for one size (zero when the size is unknown).
    pub fn stock_for(&self, size: &str) -> u32 {
        self.stock.get(size).copied().unwrap_or(0)
    }
}

/// Body of `POST /product` and `PUT /product/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub sku: String,
    pub name: String,
    pub size: Vec<String>,
    pub image: String,
    pub category: Vec<String>,
    pub description: String,
    #[ts(type = "number")]
    pub price: Money,
    pub stock: HashMap<String, u32>,
    pub status: ProductStatus,
}

/// Query string of `GET /product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub page: u32,

    /// Name filter from the search box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Falls back to the store's current page size when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u32>,
}

impl ProductQuery {
    /// Query for one page at the store's current page size.
    pub fn page(page: u32) -> Self {
        ProductQuery {
            page,
            name: None,
            items_per_page: None,
        }
    }

    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = Some(items_per_page);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery::page(1)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A line of the shopping cart, with the product populated by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "productId")]
    pub product: Product,

    pub size: String,

    pub qty: u32,
}

impl CartItem {
    /// Unit price × quantity, or `None` if it overflows.
    pub fn line_total(&self) -> Option<Money> {
        self.product.price.checked_multiply_quantity(self.qty)
    }
}

/// Sum of `unit price × qty` over the cart.
///
/// Always recomputed from the full list; there is no incremental path.
/// Returns `None` when a line or the sum leaves the representable range.
pub fn cart_total(items: &[CartItem]) -> Option<Money> {
    items
        .iter()
        .try_fold(Money::zero(), |total, item| total.checked_add(item.line_total()?))
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: String,
    pub size: String,
    pub qty: u32,
}

impl AddToCart {
    /// One unit of a product in the given size.
    pub fn single(product_id: impl Into<String>, size: impl Into<String>) -> Self {
        AddToCart {
            product_id: product_id.into(),
            size: size.into(),
            qty: 1,
        }
    }
}

/// Body of `PUT /cart/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QtyUpdate {
    pub qty: u32,
}

// =============================================================================
// Order
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Preparing,
    Shipping,
    Delivered,
    Refund,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
}

/// One line of an order being placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub size: String,
    pub qty: u32,
    #[ts(type = "number")]
    pub price: Money,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        OrderLine {
            product_id: item.product.id.clone(),
            size: item.size.clone(),
            qty: item.qty,
            price: item.product.price,
        }
    }
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    #[ts(type = "number")]
    pub total_price: Money,
    pub ship_to: ShippingAddress,
    pub contact: ContactInfo,
    pub order_list: Vec<OrderLine>,
}

impl OrderForm {
    /// Builds the checkout payload from the current cart.
    pub fn from_cart(
        items: &[CartItem],
        ship_to: ShippingAddress,
        contact: ContactInfo,
    ) -> ValidationResult<Self> {
        let total_price = cart_total(items).ok_or_else(|| ValidationError::Overflow {
            field: "totalPrice".to_string(),
        })?;

        Ok(OrderForm {
            total_price,
            ship_to,
            contact,
            order_list: items.iter().map(OrderLine::from).collect(),
        })
    }
}

/// A line of a placed order, with the product populated by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    #[serde(rename = "productId")]
    pub product: Product,
    pub size: String,
    pub qty: u32,
    #[ts(type = "number")]
    pub price: Money,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,

    /// Human-facing confirmation number.
    pub order_num: String,

    #[serde(default)]
    pub status: OrderStatus,

    #[ts(type = "number")]
    pub total_price: Money,

    #[serde(default)]
    pub ship_to: ShippingAddress,

    #[serde(default)]
    pub contact: ContactInfo,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Query string of `GET /order`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Order-number search from the admin screen.
    #[serde(rename = "ordernum", default, skip_serializing_if = "Option::is_none")]
    pub order_num: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
