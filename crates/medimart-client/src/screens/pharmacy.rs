//! Pharmacy detail screen: one pharmacy's catalogue with per-medicine
//! cart quantities.

use medimart_core::{Medicine, Pharmacy};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::StorefrontApi;
use crate::auth::TokenStore;
use crate::cart::{CartStore, CartWatch};
use crate::error::{ClientError, ClientResult};
use crate::events::CartEvents;
use crate::quantity::{LineItemActions, QuantitySelector};
use crate::session::Storefront;

use super::require_token;

pub struct PharmacyScreen {
    api: Arc<dyn StorefrontApi>,
    tokens: Arc<TokenStore>,
    store: Arc<CartStore>,
    events: CartEvents,

    pharmacy_id: String,
    pharmacy: Option<Pharmacy>,
    medicines: Vec<Medicine>,
}

impl PharmacyScreen {
    pub fn new(session: &Storefront, pharmacy_id: impl Into<String>) -> Self {
        PharmacyScreen {
            api: Arc::clone(session.api()),
            tokens: Arc::clone(session.tokens()),
            store: session.cart_store(),
            events: session.events().clone(),
            pharmacy_id: pharmacy_id.into(),
            pharmacy: None,
            medicines: Vec::new(),
        }
    }

    /// Loads the pharmacy, its medicines and the cart together.
    pub async fn load(&mut self) -> ClientResult<()> {
        let store = Arc::clone(&self.store);
        let (pharmacy, medicines, _) = tokio::try_join!(
            self.api.get_pharmacy(&self.pharmacy_id),
            self.api.list_pharmacy_medicines(&self.pharmacy_id),
            async move { Ok::<_, ClientError>(store.load_cart().await) },
        )?;
        debug!(pharmacy_id = %pharmacy.id, medicines = medicines.len(), "Pharmacy screen loaded");
        self.pharmacy = Some(pharmacy);
        self.medicines = medicines;
        Ok(())
    }

    pub fn watch(&self) -> CartWatch {
        self.store.watch(&self.events)
    }

    pub fn pharmacy(&self) -> Option<&Pharmacy> {
        self.pharmacy.as_ref()
    }

    pub fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }

    /// Quantity of `medicine_id` in the cart. A cart that belongs to a
    /// different pharmacy counts as empty here.
    pub fn quantity_of(&self, medicine_id: &str) -> i64 {
        self.store.with_snapshot(|snapshot| match &snapshot.cart {
            Some(cart) if cart.is_for_pharmacy(&self.pharmacy_id) => cart.quantity_of(medicine_id),
            _ => 0,
        })
    }

    pub fn cart_badge(&self) -> Option<String> {
        self.store.with_snapshot(|snapshot| snapshot.badge_label())
    }

    pub fn selector_for(&self, medicine: &Medicine) -> QuantitySelector {
        let actions = LineItemActions::new(Arc::clone(&self.store), self.events.clone(), medicine.id.clone());
        QuantitySelector::new(
            Arc::new(actions),
            self.quantity_of(&medicine.id),
            Some(medicine.stock_quantity),
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit. Requires a signed-in user.
    pub async fn add_to_cart(&self, medicine_id: &str) -> ClientResult<()> {
        if let Err(e) = require_token(&self.tokens) {
            info!(medicine_id, "Login required to add to cart");
            return Err(e);
        }
        self.store.add_to_cart(medicine_id, 1).await?;
        self.events.emit();
        Ok(())
    }

    pub async fn update_quantity(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        self.store.update_quantity(medicine_id, quantity).await?;
        self.events.emit();
        Ok(())
    }
}

impl std::fmt::Debug for PharmacyScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PharmacyScreen")
            .field("pharmacy_id", &self.pharmacy_id)
            .field("medicines", &self.medicines.len())
            .field("store", &self.store)
            .finish()
    }
}
