//! # medimart-core: Pure Business Logic for MediMart
//!
//! This crate holds the storefront's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediMart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Screens (Cart, Pharmacy, Medicine, Checkout)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        medimart-client (API client, CartStore, event bus)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ medimart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │ Medicine  │  │   Money   │  │ Breakdown │  │   phone   │  │   │
//! │  │   │   Cart    │  │  (paise)  │  │  Policy   │  │  pincode  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (Medicine, Cart, Order, Address, etc.)
//! - [`money`] - Money type with integer paise arithmetic
//! - [`pricing`] - MRP total, discount, handling charge, delivery fee
//! - [`error`] - Domain error types
//! - [`validation`] - Form and quantity validation
//!
//! ## Example Usage
//!
//! ```rust
//! use medimart_core::money::Money;
//! use medimart_core::pricing::{PricingBreakdown, PricingPolicy};
//! use medimart_core::types::{Cart, CartItem, Medicine};
//!
//! let cart = Cart {
//!     id: "c1".into(),
//!     user_id: "u1".into(),
//!     pharmacy_id: "p1".into(),
//!     items: vec![CartItem {
//!         medicine_id: "m1".into(),
//!         quantity: 2,
//!         price: Money::from_rupees(100),
//!     }],
//!     total_amount: Money::from_rupees(200),
//! };
//! let medicine = Medicine::new(
//!     "m1",
//!     "p1",
//!     "Amoxicillin 500mg",
//!     Money::from_rupees(100),
//!     Money::from_rupees(150),
//!     20,
//! );
//!
//! let totals = PricingBreakdown::compute(&cart, &[medicine], &PricingPolicy::default());
//! assert_eq!(totals.grand_total, Money::from_rupees(260));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PricingBreakdown, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest value offered by the quantity picker, regardless of stock.
pub const PICKER_CEILING: i64 = 10;

/// Cart badge counts above this value render as "10+".
pub const BADGE_CAP: i64 = 10;

/// Default search radius (km) when listing pharmacies near a location.
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 10.0;
