//! # medimart-client: Storefront Client for MediMart
//!
//! This crate owns every network call and every piece of runtime state the
//! storefront screens share: the REST client, the token store, the cart
//! event bus, per-screen cart stores and quantity selectors.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Data Flow                               │
//! │                                                                         │
//! │  Screen mounts                                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌──────────────────┐  parallel fetch   ┌──────────────────────────┐   │
//! │  │ CartScreen /     │──────────────────►│ StorefrontApi (HttpApi)  │   │
//! │  │ PharmacyScreen / │                   │ bearer token attached    │   │
//! │  │ MedicineScreen / │◄──────────────────│ null body → None         │   │
//! │  │ CheckoutScreen   │                   └──────────────────────────┘   │
//! │  └────────┬─────────┘                                ▲                  │
//! │           │ owns                                     │                  │
//! │           ▼                                          │                  │
//! │  ┌──────────────────┐   mutation    ┌────────────────┴─────────┐       │
//! │  │ QuantitySelector │──────────────►│ CartStore                │       │
//! │  │ EMPTY/SET/PICKING│               │ call API, then reload    │       │
//! │  │ + BUSY overlay   │               │ snapshot replaced whole  │       │
//! │  └──────────────────┘               └────────────┬─────────────┘       │
//! │                                                  │ success             │
//! │                                                  ▼                      │
//! │                                     ┌──────────────────────────┐       │
//! │                                     │ CartEvents::emit()       │       │
//! │                                     │ every watching CartStore │       │
//! │                                     │ re-fetches               │       │
//! │                                     └──────────────────────────┘       │
//! │                                                                         │
//! │  Totals come from medimart_core::PricingBreakdown on every render.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `StorefrontApi` trait and its reqwest implementation
//! - [`auth`] - Bearer token store with optional file persistence
//! - [`cart`] - `CartStore` and `CartSnapshot`
//! - [`config`] - Client configuration (TOML + environment)
//! - [`error`] - Client error types
//! - [`events`] - Cart event bus
//! - [`mailbox`] - One-shot address selection handoff
//! - [`quantity`] - Quantity selector state machine
//! - [`screens`] - Cart, pharmacy, medicine and checkout view-models
//! - [`session`] - `Storefront` application context
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medimart_client::{ClientConfig, Storefront};
//! use medimart_client::screens::CartScreen;
//!
//! let config = ClientConfig::load_or_default(None);
//! let session = Storefront::from_config(&config)?;
//! session.login("asha", "secret").await?;
//!
//! let mut screen = CartScreen::new(&session);
//! screen.load().await?;
//! if let Some(bill) = screen.pricing() {
//!     println!("To pay: {}", bill.grand_total);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod mailbox;
pub mod quantity;
pub mod screens;
pub mod session;

#[cfg(test)]
mod mock;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{GeoQuery, HttpApi, StorefrontApi};
pub use auth::TokenStore;
pub use cart::{CartSnapshot, CartStore, CartWatch};
pub use config::{ApiSettings, ClientConfig, SessionSettings};
pub use error::{ClientError, ClientResult};
pub use events::{CartEvents, Subscription};
pub use mailbox::AddressSelection;
pub use quantity::{
    Ignored, LineItemActions, PickerOption, QuantityActions, QuantitySelector, SelectorState,
    Transition,
};
pub use session::Storefront;
