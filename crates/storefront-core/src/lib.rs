//! # storefront-core: Pure Domain Logic for the Storefront
//!
//! This crate holds everything the storefront state layer knows about its
//! domain, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI component tree                            │   │
//! │  │    Catalog ──► Product Detail ──► Cart ──► Checkout ──► Orders  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ reads snapshots, invokes operations    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         storefront-state (Cart/Order/Product/User stores)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │Validation │  │   forms   │  │   │
//! │  │   │ CartItem  │  │ cart_total│  │   Error   │  │ quantities│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let unit_price = Money::from_major(10);
//! let line_total = unit_price.multiply_quantity(2);
//! assert_eq!(line_total, Money::from_major(20));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Catalog page size used until the user picks another one.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 5;

/// Page sizes offered by the item-count selector.
pub const ITEMS_PER_PAGE_OPTIONS: [u32; 4] = [5, 10, 20, 50];

/// Key under which the session token is persisted.
pub const SESSION_TOKEN_KEY: &str = "token";

/// Route the UI is sent to after a successful registration.
pub const LOGIN_ROUTE: &str = "/login";

/// Marker the backing store puts in uniqueness-violation messages.
pub const DUPLICATE_KEY_MARKER: &str = "E11000";

/// Message surfaced instead of a raw uniqueness violation.
pub const DUPLICATE_IDENTIFIER_MESSAGE: &str = "identifier already exists";

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: u32 = 999;
