//! # Error Types
//!
//! Domain-specific error types for medimart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medimart-core errors (this file)                                      │
//! │  ├── CoreError        - Storefront rule violations                     │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  medimart-client errors (separate crate)                               │
//! │  └── ClientError      - Network, HTTP, config, auth failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → caller / screen     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Storefront business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The cart is absent or has no items, so there is nothing to order.
    ///
    /// ## When This Occurs
    /// - Checkout opened after the last item was removed on another screen
    /// - Order placed right after a COD order cleared the cart server-side
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart subtotal is below the pharmacy's minimum order amount.
    #[error("Minimum order amount is {minimum}, cart subtotal is {subtotal}")]
    BelowMinimumOrder { minimum: Money, subtotal: Money },

    /// Requested quantity exceeds the medicine's stock.
    #[error("Only {available} of {medicine_id} in stock, requested {requested}")]
    InsufficientStock {
        medicine_id: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when form input doesn't meet requirements and are raised
/// before any request leaves the client.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (phone, pincode, email, UPI id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
