//! # Store Error Types
//!
//! Every failure a store operation can hit collapses into [`StoreError`],
//! and its `Display` text is the operation's rejection reason.
//!
//! ```text
//! ClientError ──────┐
//!   Transport       │
//!   Status          ├──► StoreError ──► to_string() ──► Rejected(reason)
//!   Decode          │                                   store.error = reason
//! ValidationError ──┤
//! duplicate key ────┘  (create_product only: "identifier already exists")
//! ```

use thiserror::Error;

use storefront_client::ClientError;
use storefront_core::{ValidationError, DUPLICATE_IDENTIFIER_MESSAGE, DUPLICATE_KEY_MARKER};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure or unexpected response.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Input rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend reported a uniqueness violation.
    #[error("{}", DUPLICATE_IDENTIFIER_MESSAGE)]
    DuplicateIdentifier,

    /// An operation settled as rejected; carries the reason verbatim.
    #[error("{0}")]
    Rejected(String),
}

impl StoreError {
    /// Replaces a raw duplicate-key failure with the fixed message.
    ///
    /// Any other error passes through untouched.
    pub fn translate_duplicate(self) -> Self {
        if self.to_string().contains(DUPLICATE_KEY_MARKER) {
            StoreError::DuplicateIdentifier
        } else {
            self
        }
    }

    /// Returns true if no request was sent because the input was invalid.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}
