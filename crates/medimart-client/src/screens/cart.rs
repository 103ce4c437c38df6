//! Cart screen: line items, delivery address, and bill details.

use medimart_core::pricing::{line_totals, LineTotals};
use medimart_core::{Address, Cart, CartItem, Medicine, PricingBreakdown, PricingPolicy, Profile};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::StorefrontApi;
use crate::auth::TokenStore;
use crate::cart::{CartSnapshot, CartStore, CartWatch};
use crate::error::{ClientError, ClientResult};
use crate::events::CartEvents;
use crate::mailbox::AddressSelection;
use crate::quantity::{LineItemActions, QuantitySelector};
use crate::session::Storefront;

use super::{load_line_medicines, require_token, resolve_address};

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    /// `None` if the record could not be matched to the line.
    pub medicine: Option<Medicine>,
    pub totals: LineTotals,
}

pub struct CartScreen {
    api: Arc<dyn StorefrontApi>,
    tokens: Arc<TokenStore>,
    store: Arc<CartStore>,
    events: CartEvents,
    mailbox: AddressSelection,
    pricing: PricingPolicy,

    medicines: Vec<Medicine>,
    addresses: Vec<Address>,
    profile: Option<Profile>,
    delivery_address: Option<Address>,
}

impl CartScreen {
    pub fn new(session: &Storefront) -> Self {
        CartScreen {
            api: Arc::clone(session.api()),
            tokens: Arc::clone(session.tokens()),
            store: session.cart_store(),
            events: session.events().clone(),
            mailbox: session.address_selection().clone(),
            pricing: *session.pricing(),
            medicines: Vec::new(),
            addresses: Vec::new(),
            profile: None,
            delivery_address: None,
        }
    }

    /// Loads cart, addresses and profile together, then each line's medicine.
    ///
    /// A pending address selection is consumed here.
    pub async fn load(&mut self) -> ClientResult<()> {
        require_token(&self.tokens)?;

        let store = Arc::clone(&self.store);
        let (snapshot, addresses, profile) = tokio::try_join!(
            async move { Ok::<_, ClientError>(store.load_cart().await) },
            self.api.list_addresses(),
            self.api.get_profile(),
        )?;
        self.medicines = load_line_medicines(self.api.as_ref(), snapshot.cart.as_ref()).await?;

        let pending = self.mailbox.take();
        let current = self.delivery_address.as_ref().map(|a| a.id.clone());
        let preferred = pending.or(current);
        self.delivery_address = resolve_address(&addresses, preferred.as_deref());
        self.addresses = addresses;
        self.profile = Some(profile);

        debug!(
            lines = self.medicines.len(),
            addresses = self.addresses.len(),
            "Cart screen loaded"
        );
        Ok(())
    }

    /// Reloads this screen's cart whenever another screen changes it.
    pub fn watch(&self) -> CartWatch {
        self.store.watch(&self.events)
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn snapshot(&self) -> CartSnapshot {
        self.store.snapshot()
    }

    pub fn cart(&self) -> Option<Cart> {
        self.store.snapshot().cart
    }

    pub fn is_checkoutable(&self) -> bool {
        self.store.with_snapshot(CartSnapshot::is_checkoutable)
    }

    pub fn lines(&self) -> Vec<CartLine> {
        let Some(cart) = self.cart() else {
            return Vec::new();
        };
        cart.items
            .into_iter()
            .map(|item| {
                let medicine = self.medicine(&item.medicine_id).cloned();
                let totals = line_totals(&item, medicine.as_ref());
                CartLine {
                    item,
                    medicine,
                    totals,
                }
            })
            .collect()
    }

    /// Bill details, or `None` when there is nothing to check out.
    pub fn pricing(&self) -> Option<PricingBreakdown> {
        self.store.with_snapshot(|snapshot| {
            snapshot
                .cart
                .as_ref()
                .filter(|cart| !cart.is_empty())
                .map(|cart| PricingBreakdown::compute(cart, &self.medicines, &self.pricing))
        })
    }

    pub fn medicine(&self, medicine_id: &str) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.id == medicine_id)
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn delivery_address(&self) -> Option<&Address> {
        self.delivery_address.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Quantity picker for one line, capped at the medicine's stock.
    pub fn selector_for(&self, medicine_id: &str) -> QuantitySelector {
        let actions = LineItemActions::new(Arc::clone(&self.store), self.events.clone(), medicine_id);
        QuantitySelector::new(
            Arc::new(actions),
            self.store.get_item_quantity(medicine_id),
            self.medicine(medicine_id).map(|m| m.stock_quantity),
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Changes a line's quantity. Once the server accepts the change the
    /// other screens are notified, even if the line details fail to refresh.
    pub async fn update_quantity(&mut self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        self.store.update_quantity(medicine_id, quantity).await?;
        self.events.emit();
        self.refresh_medicines().await;
        Ok(())
    }

    pub async fn remove_item(&mut self, medicine_id: &str) -> ClientResult<()> {
        self.store.remove_from_cart(medicine_id).await?;
        self.events.emit();
        self.refresh_medicines().await;
        Ok(())
    }

    /// Keeps the previous medicine records when the refresh fails.
    async fn refresh_medicines(&mut self) {
        let cart = self.cart();
        match load_line_medicines(self.api.as_ref(), cart.as_ref()).await {
            Ok(medicines) => self.medicines = medicines,
            Err(e) => warn!(error = %e, "Error refreshing cart medicines"),
        }
    }
}

impl std::fmt::Debug for CartScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartScreen")
            .field("store", &self.store)
            .field("medicines", &self.medicines.len())
            .field("delivery_address", &self.delivery_address.as_ref().map(|a| &a.id))
            .finish()
    }
}
