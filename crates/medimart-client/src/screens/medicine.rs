//! Medicine detail screen.

use medimart_core::{Medicine, Money, Review};
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

pub struct MedicineScreen {
    api: Arc<dyn StorefrontApi>,
    tokens: Arc<TokenStore>,
    store: Arc<CartStore>,
    events: CartEvents,

    medicine_id: String,
    medicine: Option<Medicine>,
    reviews: Vec<Review>,
    alternatives: Vec<Medicine>,
}

impl MedicineScreen {
    pub fn new(session: &Storefront, medicine_id: impl Into<String>) -> Self {
        MedicineScreen {
            api: Arc::clone(session.api()),
            tokens: Arc::clone(session.tokens()),
            store: session.cart_store(),
            events: session.events().clone(),
            medicine_id: medicine_id.into(),
            medicine: None,
            reviews: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Loads the medicine, its reviews, alternatives and the cart together.
    pub async fn load(&mut self) -> ClientResult<()> {
        let store = Arc::clone(&self.store);
        let (medicine, reviews, alternatives, _) = tokio::try_join!(
            self.api.get_medicine(&self.medicine_id),
            self.api.get_reviews(&self.medicine_id),
            self.api.get_alternatives(&self.medicine_id),
            async move { Ok::<_, ClientError>(store.load_cart().await) },
        )?;
        debug!(
            medicine_id = %medicine.id,
            reviews = reviews.len(),
            alternatives = alternatives.len(),
            "Medicine screen loaded"
        );
        self.medicine = Some(medicine);
        self.reviews = reviews;
        self.alternatives = alternatives;
        Ok(())
    }

    pub fn watch(&self) -> CartWatch {
        self.store.watch(&self.events)
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn medicine(&self) -> Option<&Medicine> {
        self.medicine.as_ref()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn alternatives(&self) -> &[Medicine] {
        &self.alternatives
    }

    /// Mean review rating, 0 without reviews.
    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        self.reviews.iter().map(|r| r.rating).sum::<f64>() / self.reviews.len() as f64
    }

    pub fn quantity(&self) -> i64 {
        self.store.get_item_quantity(&self.medicine_id)
    }

    /// Price shown on the add bar: price × max(quantity, 1).
    pub fn display_total(&self) -> Option<Money> {
        self.medicine
            .as_ref()
            .map(|m| m.price.multiply_quantity(self.quantity().max(1)))
    }

    pub fn selector(&self) -> QuantitySelector {
        let actions = LineItemActions::new(Arc::clone(&self.store), self.events.clone(), self.medicine_id.clone());
        QuantitySelector::new(
            Arc::new(actions),
            self.quantity(),
            self.medicine.as_ref().map(|m| m.stock_quantity),
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit. Requires a signed-in user.
    pub async fn add_to_cart(&self) -> ClientResult<()> {
        if let Err(e) = require_token(&self.tokens) {
            info!(medicine_id = %self.medicine_id, "Login required to add to cart");
            return Err(e);
        }
        self.store.add_to_cart(&self.medicine_id, 1).await?;
        self.events.emit();
        Ok(())
    }

    pub async fn increase(&self) -> ClientResult<()> {
        self.set_quantity(self.quantity() + 1).await
    }

    pub async fn decrease(&self) -> ClientResult<()> {
        self.set_quantity(self.quantity() - 1).await
    }

    pub async fn set_quantity(&self, quantity: i64) -> ClientResult<()> {
        self.store.update_quantity(&self.medicine_id, quantity).await?;
        self.events.emit();
        Ok(())
    }

    pub async fn remove(&self) -> ClientResult<()> {
        self.store.remove_from_cart(&self.medicine_id).await?;
        self.events.emit();
        Ok(())
    }
}

impl std::fmt::Debug for MedicineScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedicineScreen")
            .field("medicine_id", &self.medicine_id)
            .field("reviews", &self.reviews.len())
            .field("store", &self.store)
            .finish()
    }
}
