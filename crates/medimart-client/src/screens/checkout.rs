//! # Checkout Screen
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        place_order() Guards                             │
//! │                                                                         │
//! │  cart empty / absent            ──► CoreError::EmptyCart                │
//! │  subtotal < pharmacy minimum    ──► CoreError::BelowMinimumOrder        │
//! │  delivery address blank         ──► ValidationError::Required           │
//! │  phone not [6-9] + 9 digits     ──► ValidationError::InvalidFormat      │
//! │                                                                         │
//! │  all pass ──► create_order ──► reload cart ──► CartEvents::emit()       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guards run before any request; a rejected order never reaches the
//! backend.

use medimart_core::pricing::check_minimum_order;
use medimart_core::validation::validate_phone;
use medimart_core::{
    Address, CoreError, Medicine, Order, OrderRequest, PaymentMethod, Pharmacy, PricingBreakdown,
    PricingPolicy, ValidationError,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::StorefrontApi;
use crate::auth::TokenStore;
use crate::cart::{CartSnapshot, CartStore};
use crate::error::{ClientError, ClientResult};
use crate::events::CartEvents;
use crate::mailbox::AddressSelection;
use crate::session::Storefront;

use super::{load_line_medicines, require_token, resolve_address};

pub struct CheckoutScreen {
    api: Arc<dyn StorefrontApi>,
    tokens: Arc<TokenStore>,
    store: Arc<CartStore>,
    events: CartEvents,
    mailbox: AddressSelection,
    pricing: PricingPolicy,

    medicines: Vec<Medicine>,
    addresses: Vec<Address>,
    pharmacy: Option<Pharmacy>,

    /// Submitted delivery address, prefilled from the resolved address.
    pub delivery_address: String,
    /// Contact phone, prefilled from the resolved address.
    pub phone: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutScreen {
    pub fn new(session: &Storefront) -> Self {
        CheckoutScreen {
            api: Arc::clone(session.api()),
            tokens: Arc::clone(session.tokens()),
            store: session.cart_store(),
            events: session.events().clone(),
            mailbox: session.address_selection().clone(),
            pricing: *session.pricing(),
            medicines: Vec::new(),
            addresses: Vec::new(),
            pharmacy: None,
            delivery_address: String::new(),
            phone: String::new(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// Loads cart and addresses together, then line medicines and the
    /// cart's pharmacy.
    pub async fn load(&mut self) -> ClientResult<()> {
        require_token(&self.tokens)?;

        let store = Arc::clone(&self.store);
        let (snapshot, addresses) = tokio::try_join!(
            async move { Ok::<_, ClientError>(store.load_cart().await) },
            self.api.list_addresses(),
        )?;

        let cart = snapshot.cart.as_ref().filter(|c| !c.is_empty());
        let pharmacy_id = cart.map(|c| c.pharmacy_id.clone()).filter(|id| !id.is_empty());
        let (medicines, pharmacy) = tokio::try_join!(
            load_line_medicines(self.api.as_ref(), cart),
            async {
                match &pharmacy_id {
                    Some(id) => self.api.get_pharmacy(id).await.map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let pending = self.mailbox.take();
        if let Some(address) = resolve_address(&addresses, pending.as_deref()) {
            if pending.is_some() || self.delivery_address.trim().is_empty() {
                self.delivery_address = address.one_line();
            }
            if self.phone.trim().is_empty() {
                self.phone = address.phone.clone();
            }
        }

        self.medicines = medicines;
        self.addresses = addresses;
        self.pharmacy = pharmacy;
        debug!(lines = self.medicines.len(), "Checkout screen loaded");
        Ok(())
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn snapshot(&self) -> CartSnapshot {
        self.store.snapshot()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn pharmacy(&self) -> Option<&Pharmacy> {
        self.pharmacy.as_ref()
    }

    /// Same bill as the cart screen, or `None` for an empty cart.
    pub fn pricing(&self) -> Option<PricingBreakdown> {
        self.store.with_snapshot(|snapshot| {
            snapshot
                .cart
                .as_ref()
                .filter(|cart| !cart.is_empty())
                .map(|cart| PricingBreakdown::compute(cart, &self.medicines, &self.pricing))
        })
    }

    /// Runs every guard without placing the order.
    pub fn check(&self) -> ClientResult<()> {
        let subtotal = self.store.with_snapshot(|snapshot| {
            snapshot
                .cart
                .as_ref()
                .filter(|cart| !cart.is_empty())
                .map(|cart| cart.total_amount)
        });
        let subtotal = subtotal.ok_or(CoreError::EmptyCart)?;

        if let Some(pharmacy) = &self.pharmacy {
            check_minimum_order(subtotal, pharmacy.minimum_order)?;
        }

        if self.delivery_address.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "delivery_address".to_string(),
            }
            .into());
        }
        validate_phone(self.phone.trim())?;
        Ok(())
    }

    // =========================================================================
    // Place Order
    // =========================================================================

    pub async fn place_order(&self) -> ClientResult<Order> {
        self.check()?;

        let request = OrderRequest {
            delivery_address: self.delivery_address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            payment_method: self.payment_method,
        };
        let order = self.api.create_order(&request).await?;
        info!(
            order_id = %order.id,
            payment_method = %self.payment_method,
            total = %order.total_amount,
            "Order placed"
        );

        self.store.load_cart().await;
        self.events.emit();
        Ok(order)
    }
}

impl std::fmt::Debug for CheckoutScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutScreen")
            .field("store", &self.store)
            .field("payment_method", &self.payment_method)
            .field("pharmacy", &self.pharmacy.as_ref().map(|p| &p.id))
            .finish()
    }
}
