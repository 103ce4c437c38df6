//! # Cart Store
//!
//! The in-memory view of "my cart" that a screen renders from.
//!
//! ## Refresh Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartStore Refresh                                │
//! │                                                                         │
//! │  Trigger                     Action                 Snapshot            │
//! │  ───────                     ──────                 ────────            │
//! │                                                                         │
//! │  screen focus  ──────────►  load_cart()  ──────►  replaced wholesale    │
//! │  CartEvents::emit ───────►  load_cart()  ──────►  replaced wholesale    │
//! │                                                                         │
//! │  add / update / remove ──►  API call ──ok──► load_cart()                │
//! │                                 │                                       │
//! │                                 └─err──► log, return error              │
//! │                                          (snapshot untouched)           │
//! │                                                                         │
//! │  load_cart(): no token     ──► empty snapshot, no request               │
//! │               fetch failed ──► empty snapshot, logged                   │
//! │               fetch ok     ──► server cart (None = empty)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each screen owns its own `CartStore`. Stores never share a cart; they
//! stay consistent by re-fetching on the same bus signal. The store never
//! predicts a mutation's outcome.

use medimart_core::{cart_item_count, cart_quantity_of, is_checkoutable, Cart, BADGE_CAP};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::api::StorefrontApi;
use crate::auth::TokenStore;
use crate::error::ClientResult;
use crate::events::{CartEvents, Subscription};

// =============================================================================
// Cart Snapshot
// =============================================================================

/// A point-in-time copy of the server cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    /// `None` when the user has no cart, is signed out, or the fetch failed.
    pub cart: Option<Cart>,
    /// Σ quantity across all lines.
    pub item_count: i64,
}

impl CartSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_cart(cart: Option<Cart>) -> Self {
        let item_count = cart_item_count(cart.as_ref());
        CartSnapshot { cart, item_count }
    }

    /// Quantity of `medicine_id`, or 0.
    pub fn quantity_of(&self, medicine_id: &str) -> i64 {
        cart_quantity_of(self.cart.as_ref(), medicine_id)
    }

    pub fn is_checkoutable(&self) -> bool {
        is_checkoutable(self.cart.as_ref())
    }

    /// Text for the cart icon badge: `None` when empty, `"10+"` above ten.
    pub fn badge_label(&self) -> Option<String> {
        match self.item_count {
            n if n <= 0 => None,
            n if n > BADGE_CAP => Some(format!("{}+", BADGE_CAP)),
            n => Some(n.to_string()),
        }
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Per-screen cart state backed by the server.
pub struct CartStore {
    api: Arc<dyn StorefrontApi>,
    tokens: Arc<TokenStore>,
    state: watch::Sender<CartSnapshot>,
    loading: AtomicBool,
}

impl CartStore {
    /// Creates a store with an empty snapshot. Call [`load_cart`](Self::load_cart)
    /// (or [`on_focus`](Self::on_focus)) to populate it.
    pub fn new(api: Arc<dyn StorefrontApi>, tokens: Arc<TokenStore>) -> Self {
        let (state, _) = watch::channel(CartSnapshot::empty());
        CartStore {
            api,
            tokens,
            state,
            loading: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// Executes a function with read access to the current snapshot.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartSnapshot) -> R,
    {
        let snapshot = self.state.borrow();
        f(&*snapshot)
    }

    /// Receiver that observes every snapshot replacement.
    pub fn changes(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    pub fn item_count(&self) -> i64 {
        self.state.borrow().item_count
    }

    /// Quantity of `medicine_id` in the last loaded cart, or 0.
    pub fn get_item_quantity(&self, medicine_id: &str) -> i64 {
        self.state.borrow().quantity_of(medicine_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Reload
    // =========================================================================

    /// Re-fetches the cart and replaces the snapshot.
    ///
    /// Never fails: a missing token or a fetch error both yield an empty
    /// snapshot, so a stale cart is never left on screen.
    pub async fn load_cart(&self) -> CartSnapshot {
        if self.tokens.get().is_none() {
            debug!("No auth token, cart is empty");
            return self.replace(CartSnapshot::empty());
        }

        self.loading.store(true, Ordering::SeqCst);
        let result = self.api.get_cart().await;
        self.loading.store(false, Ordering::SeqCst);

        let snapshot = match result {
            Ok(cart) => CartSnapshot::from_cart(cart),
            Err(e) => {
                error!(error = %e, "Error loading cart");
                CartSnapshot::empty()
            }
        };
        debug!(item_count = snapshot.item_count, "Cart reloaded");
        self.replace(snapshot)
    }

    /// Screen gained focus.
    pub async fn on_focus(&self) -> CartSnapshot {
        self.load_cart().await
    }

    fn replace(&self, snapshot: CartSnapshot) -> CartSnapshot {
        self.state.send_replace(snapshot.clone());
        snapshot
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of a medicine, then reloads.
    ///
    /// Does not emit on the bus; callers that need other screens to refresh
    /// emit themselves.
    pub async fn add_to_cart(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        if let Err(e) = self.api.add_to_cart(medicine_id, quantity).await {
            error!(medicine_id, quantity, error = %e, "Error adding to cart");
            return Err(e);
        }
        self.load_cart().await;
        Ok(())
    }

    /// Sets a line's quantity, then reloads. The value is forwarded as-is;
    /// the server removes the line for 0 and rejects negatives.
    pub async fn update_quantity(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        if let Err(e) = self.api.update_cart_item(medicine_id, quantity).await {
            error!(medicine_id, quantity, error = %e, "Error updating quantity");
            return Err(e);
        }
        self.load_cart().await;
        Ok(())
    }

    /// Removes a line, then reloads.
    pub async fn remove_from_cart(&self, medicine_id: &str) -> ClientResult<()> {
        if let Err(e) = self.api.remove_from_cart(medicine_id).await {
            error!(medicine_id, error = %e, "Error removing from cart");
            return Err(e);
        }
        self.load_cart().await;
        Ok(())
    }

    /// Empties the cart, then reloads.
    pub async fn clear(&self) -> ClientResult<()> {
        if let Err(e) = self.api.clear_cart().await {
            error!(error = %e, "Error clearing cart");
            return Err(e);
        }
        self.load_cart().await;
        Ok(())
    }

    // =========================================================================
    // Bus Wiring
    // =========================================================================

    /// Reloads this store every time `events` emits, until the returned
    /// [`CartWatch`] is dropped.
    ///
    /// Emits that arrive while a reload is running coalesce into one more
    /// reload. Must be called inside a Tokio runtime.
    pub fn watch(self: &Arc<Self>, events: &CartEvents) -> CartWatch {
        let notify = Arc::new(Notify::new());

        let signal = Arc::clone(&notify);
        let subscription = events.subscribe(move || signal.notify_one());

        let store = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                notify.notified().await;
                store.load_cart().await;
            }
        });

        CartWatch {
            _subscription: subscription,
            task,
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("snapshot", &*self.state.borrow())
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Keeps a [`CartStore`] subscribed to the bus. Dropping it unsubscribes
/// and stops the reload task.
#[must_use = "dropping a CartWatch stops the automatic reloads"]
#[derive(Debug)]
pub struct CartWatch {
    _subscription: Subscription,
    task: JoinHandle<()>,
}

impl Drop for CartWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
