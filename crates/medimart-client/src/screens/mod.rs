//! # Screen View-Models
//!
//! Each screen owns its own [`CartStore`](crate::cart::CartStore) and
//! loads its dependent data independently.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Screen Load                                   │
//! │                                                                         │
//! │  load() ──► try_join!( cart, related entities... )                      │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │           try_join_all( get_medicine(item) for each cart line )         │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │           PricingBreakdown / LineTotals / quantity lookups              │
//! │                                                                         │
//! │  mutation ──► CartStore (API + reload) ──► CartEvents::emit()           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Screen          | Loads                                      |
//! |-----------------|--------------------------------------------|
//! | Cart            | cart, addresses, profile, line medicines   |
//! | Pharmacy detail | pharmacy, its medicines, cart              |
//! | Medicine detail | medicine, reviews, alternatives, cart      |
//! | Checkout        | cart, addresses, line medicines, pharmacy  |

pub mod cart;
pub mod checkout;
pub mod medicine;
pub mod pharmacy;

pub use cart::{CartLine, CartScreen};
pub use checkout::CheckoutScreen;
pub use medicine::MedicineScreen;
pub use pharmacy::PharmacyScreen;

use futures_util::future::try_join_all;
use medimart_core::{Address, Cart, Medicine};

use crate::api::StorefrontApi;
use crate::auth::TokenStore;
use crate::error::{ClientError, ClientResult};

/// Fetches the medicine record behind every cart line concurrently.
pub(crate) async fn load_line_medicines(
    api: &dyn StorefrontApi,
    cart: Option<&Cart>,
) -> ClientResult<Vec<Medicine>> {
    let Some(cart) = cart else {
        return Ok(Vec::new());
    };
    try_join_all(cart.items.iter().map(|item| api.get_medicine(&item.medicine_id))).await
}

/// Picks the delivery address: `preferred` if it is one of `addresses`,
/// else the default address, else the first.
pub(crate) fn resolve_address(addresses: &[Address], preferred: Option<&str>) -> Option<Address> {
    preferred
        .and_then(|id| addresses.iter().find(|a| a.id == id))
        .or_else(|| addresses.iter().find(|a| a.is_default))
        .or_else(|| addresses.first())
        .cloned()
}

pub(crate) fn require_token(tokens: &TokenStore) -> ClientResult<()> {
    if tokens.is_authenticated() {
        Ok(())
    } else {
        Err(ClientError::Unauthenticated)
    }
}
