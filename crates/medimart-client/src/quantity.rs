//! # Quantity Selector
//!
//! Per-line-item state machine behind the "ADD" / "{n} added" control.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Quantity Selector States                            │
//! │                                                                         │
//! │   ┌─────────┐  tap_add   ┌──────┐  add ok   ┌─────────┐                │
//! │   │  EMPTY  │──────────►│ BUSY │─────────►│   SET   │◄───┐            │
//! │   │ "ADD"   │◄─────────┐└──────┘           │"n added"│    │            │
//! │   └─────────┘          │    ▲              └──┬───┬──┘    │            │
//! │                        │    │   increment /   │   │       │ close      │
//! │                        │    └──decrement──────┘   │open   │ picker     │
//! │                        │                          ▼       │            │
//! │                        │   select(0) / remove  ┌─────────┐│            │
//! │                        └───────────────────────│ PICKING │┘            │
//! │                            (via BUSY)          │ 1..=10  │             │
//! │                                                └─────────┘             │
//! │                                                                         │
//! │  BUSY is an overlay: while a callback is in flight every input is       │
//! │  ignored, so one line item never has two mutations racing.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stepwise Fallback
//! When the caller cannot set a quantity directly, `select(v)` walks there
//! with `|v - current|` increments or decrements. If step `k + 1` fails,
//! the `k` completed steps are undone in reverse. If the undo also fails,
//! the error is [`ClientError::PartialQuantityChange`] and the selector
//! shows the quantity it actually reached.
//!
//! The selector never calls the API itself; it only dispatches to
//! [`QuantityActions`].

use async_trait::async_trait;
use medimart_core::PICKER_CEILING;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::cart::CartStore;
use crate::error::{ClientError, ClientResult};
use crate::events::CartEvents;

// =============================================================================
// Actions
// =============================================================================

/// Operations a selector dispatches to. Each returns the line's quantity
/// after the operation, as the server reports it.
#[async_trait]
pub trait QuantityActions: Send + Sync {
    async fn add(&self) -> ClientResult<i64>;
    async fn increase(&self) -> ClientResult<i64>;
    async fn decrease(&self) -> ClientResult<i64>;

    /// Whether [`set_quantity`](Self::set_quantity) is wired up. Without it,
    /// `select` falls back to stepping.
    fn supports_set_quantity(&self) -> bool {
        false
    }

    async fn set_quantity(&self, _quantity: i64) -> ClientResult<i64> {
        Err(ClientError::Unsupported("set_quantity"))
    }

    /// Whether [`remove`](Self::remove) is wired up. Without it, removing
    /// selects quantity 0.
    fn supports_remove(&self) -> bool {
        false
    }

    async fn remove(&self) -> ClientResult<i64> {
        Err(ClientError::Unsupported("remove"))
    }
}

// =============================================================================
// State
// =============================================================================

/// Visible base state. Busy is tracked separately via [`QuantitySelector::is_busy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Empty,
    Set(i64),
    Picking(i64),
}

/// Result of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The input was handled; this is the new state.
    Moved(SelectorState),
    /// The input was dropped without invoking any callback.
    Ignored(Ignored),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Busy,
    Disabled,
    AtMaximum,
    /// The input does not apply in the current state.
    NotApplicable,
}

/// One row of the quantity picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerOption {
    pub value: i64,
    pub selected: bool,
}

#[derive(Debug, Default)]
struct Inner {
    quantity: i64,
    picking: bool,
    busy: bool,
}

impl Inner {
    fn state(&self) -> SelectorState {
        match (self.quantity, self.picking) {
            (q, _) if q <= 0 => SelectorState::Empty,
            (q, true) => SelectorState::Picking(q),
            (q, false) => SelectorState::Set(q),
        }
    }
}

/// Clears the busy flag when a dispatch ends, including on error.
struct BusyGuard<'a>(&'a Mutex<Inner>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.0.lock() {
            inner.busy = false;
        }
    }
}

// =============================================================================
// Quantity Selector
// =============================================================================

pub struct QuantitySelector {
    actions: Arc<dyn QuantityActions>,
    inner: Mutex<Inner>,
    max_quantity: Option<i64>,
    disabled: bool,
}

impl QuantitySelector {
    /// Creates a selector showing `quantity`. `max_quantity` is normally the
    /// medicine's stock; `None` or a non-positive value means no limit
    /// beyond the picker's ceiling of 10.
    pub fn new(actions: Arc<dyn QuantityActions>, quantity: i64, max_quantity: Option<i64>) -> Self {
        QuantitySelector {
            actions,
            inner: Mutex::new(Inner {
                quantity: quantity.max(0),
                picking: false,
                busy: false,
            }),
            max_quantity,
            disabled: false,
        }
    }

    /// Disables every input.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("Selector mutex poisoned")
    }

    fn limit(&self) -> Option<i64> {
        self.max_quantity.filter(|m| *m > 0)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn state(&self) -> SelectorState {
        self.lock().state()
    }

    pub fn quantity(&self) -> i64 {
        self.lock().quantity
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Button text: `"ADD"` or `"{n} added"`.
    pub fn label(&self) -> String {
        match self.state() {
            SelectorState::Empty => "ADD".to_string(),
            SelectorState::Set(q) | SelectorState::Picking(q) => format!("{} added", q),
        }
    }

    fn picker_top(&self) -> i64 {
        self.limit()
            .map(|m| m.min(PICKER_CEILING))
            .unwrap_or(PICKER_CEILING)
    }

    /// Picker rows `1..=min(max, 10)`, marking the current quantity.
    pub fn picker_options(&self) -> Vec<PickerOption> {
        let current = self.quantity();
        (1..=self.picker_top())
            .map(|value| PickerOption {
                value,
                selected: value == current,
            })
            .collect()
    }

    /// Adopts a quantity from a cart reload.
    pub fn sync(&self, quantity: i64) {
        let mut inner = self.lock();
        inner.quantity = quantity.max(0);
        if inner.quantity == 0 {
            inner.picking = false;
        }
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Marks the selector busy if inputs are accepted and `allowed` holds.
    fn begin(&self, allowed: impl FnOnce(&Inner) -> bool) -> Result<BusyGuard<'_>, Ignored> {
        let mut inner = self.lock();
        if self.disabled {
            return Err(Ignored::Disabled);
        }
        if inner.busy {
            return Err(Ignored::Busy);
        }
        if !allowed(&*inner) {
            return Err(Ignored::NotApplicable);
        }
        inner.busy = true;
        Ok(BusyGuard(&self.inner))
    }

    fn apply(&self, quantity: i64, close_picker: bool) -> SelectorState {
        let mut inner = self.lock();
        inner.quantity = quantity.max(0);
        if close_picker || inner.quantity == 0 {
            inner.picking = false;
        }
        inner.state()
    }

    /// EMPTY → SET via the add callback.
    pub async fn tap_add(&self) -> ClientResult<Transition> {
        let _busy = match self.begin(|i| i.quantity == 0) {
            Ok(guard) => guard,
            Err(reason) => return Ok(Transition::Ignored(reason)),
        };
        let quantity = self.actions.add().await?;
        Ok(Transition::Moved(self.apply(quantity, true)))
    }

    /// SET → PICKING.
    pub fn open_picker(&self) -> Transition {
        let mut inner = self.lock();
        if self.disabled {
            return Transition::Ignored(Ignored::Disabled);
        }
        if inner.busy {
            return Transition::Ignored(Ignored::Busy);
        }
        if inner.quantity <= 0 {
            return Transition::Ignored(Ignored::NotApplicable);
        }
        inner.picking = true;
        Transition::Moved(inner.state())
    }

    /// PICKING → SET without changing anything.
    pub fn close_picker(&self) -> Transition {
        let mut inner = self.lock();
        if inner.busy {
            return Transition::Ignored(Ignored::Busy);
        }
        inner.picking = false;
        Transition::Moved(inner.state())
    }

    /// Picks `value` from the open picker. `0` removes the line; any other
    /// value must be one of [`picker_options`](Self::picker_options).
    ///
    /// The picker closes on success. On failure it stays open so the user
    /// can try again.
    pub async fn select(&self, value: i64) -> ClientResult<Transition> {
        let _busy = match self.begin(|i| i.picking) {
            Ok(guard) => guard,
            Err(reason) => return Ok(Transition::Ignored(reason)),
        };
        if let Err(reason) = self.check_pick(value) {
            debug!(value, ?reason, "Picker value rejected");
            return Ok(Transition::Ignored(reason));
        }
        if value == self.quantity() {
            return Ok(Transition::Moved(self.apply(value, true)));
        }
        let quantity = if value == 0 && self.actions.supports_remove() {
            self.actions.remove().await?
        } else {
            self.change_to(value).await?
        };
        Ok(Transition::Moved(self.apply(quantity, true)))
    }

    fn check_pick(&self, value: i64) -> Result<(), Ignored> {
        if value == 0 {
            return Ok(());
        }
        if let Some(max) = self.limit() {
            if value > max {
                return Err(Ignored::AtMaximum);
            }
        }
        if value < 1 || value > self.picker_top() {
            return Err(Ignored::NotApplicable);
        }
        Ok(())
    }

    /// Removes the line from the picker.
    pub async fn remove(&self) -> ClientResult<Transition> {
        let _busy = match self.begin(|i| i.quantity > 0) {
            Ok(guard) => guard,
            Err(reason) => return Ok(Transition::Ignored(reason)),
        };
        let quantity = if self.actions.supports_remove() {
            self.actions.remove().await?
        } else {
            self.change_to(0).await?
        };
        Ok(Transition::Moved(self.apply(quantity, true)))
    }

    /// SET → SET with one more unit. A no-op at the maximum.
    pub async fn increment(&self) -> ClientResult<Transition> {
        let limit = self.limit();
        let _busy = match self.begin(|i| i.quantity > 0) {
            Ok(guard) => guard,
            Err(reason) => return Ok(Transition::Ignored(reason)),
        };
        if let Some(max) = limit {
            if self.quantity() >= max {
                debug!(max, "Increment ignored at maximum quantity");
                return Ok(Transition::Ignored(Ignored::AtMaximum));
            }
        }
        let quantity = self.actions.increase().await?;
        Ok(Transition::Moved(self.apply(quantity, false)))
    }

    /// SET → SET (or EMPTY) with one unit less.
    pub async fn decrement(&self) -> ClientResult<Transition> {
        let _busy = match self.begin(|i| i.quantity > 0) {
            Ok(guard) => guard,
            Err(reason) => return Ok(Transition::Ignored(reason)),
        };
        let quantity = self.actions.decrease().await?;
        Ok(Transition::Moved(self.apply(quantity, false)))
    }

    // =========================================================================
    // Quantity Change
    // =========================================================================

    async fn change_to(&self, target: i64) -> ClientResult<i64> {
        if self.actions.supports_set_quantity() {
            return self.actions.set_quantity(target).await;
        }

        let start = self.quantity();
        let up = target > start;
        let steps = (target - start).abs();
        let mut done = 0;

        while done < steps {
            match self.step(up).await {
                Ok(quantity) => {
                    self.apply(quantity, false);
                    done += 1;
                }
                Err(cause) => {
                    warn!(target, done, error = %cause, "Stepwise quantity change failed, rolling back");
                    return self.roll_back(up, done, target, cause).await;
                }
            }
        }
        Ok(self.quantity())
    }

    async fn roll_back(&self, up: bool, done: i64, target: i64, cause: ClientError) -> ClientResult<i64> {
        for _ in 0..done {
            match self.step(!up).await {
                Ok(quantity) => {
                    self.apply(quantity, false);
                }
                Err(e) => {
                    return Err(ClientError::PartialQuantityChange {
                        target,
                        reached: self.quantity(),
                        reason: format!("{}; rollback failed: {}", cause, e),
                    });
                }
            }
        }
        Err(cause)
    }

    async fn step(&self, up: bool) -> ClientResult<i64> {
        if up {
            self.actions.increase().await
        } else {
            self.actions.decrease().await
        }
    }
}

impl std::fmt::Debug for QuantitySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantitySelector")
            .field("state", &self.state())
            .field("busy", &self.is_busy())
            .field("max_quantity", &self.max_quantity)
            .field("disabled", &self.disabled)
            .finish()
    }
}

// =============================================================================
// Cart-backed Actions
// =============================================================================

/// [`QuantityActions`] for one medicine's line in the server cart.
///
/// Every successful mutation reloads `store` and emits on `events`.
pub struct LineItemActions {
    store: Arc<CartStore>,
    events: CartEvents,
    medicine_id: String,
}

impl LineItemActions {
    pub fn new(store: Arc<CartStore>, events: CartEvents, medicine_id: impl Into<String>) -> Self {
        LineItemActions {
            store,
            events,
            medicine_id: medicine_id.into(),
        }
    }

    fn current(&self) -> i64 {
        self.store.get_item_quantity(&self.medicine_id)
    }

    fn settled(&self) -> i64 {
        self.events.emit();
        self.current()
    }
}

#[async_trait]
impl QuantityActions for LineItemActions {
    async fn add(&self) -> ClientResult<i64> {
        self.store.add_to_cart(&self.medicine_id, 1).await?;
        Ok(self.settled())
    }

    async fn increase(&self) -> ClientResult<i64> {
        let next = self.current() + 1;
        self.store.update_quantity(&self.medicine_id, next).await?;
        Ok(self.settled())
    }

    async fn decrease(&self) -> ClientResult<i64> {
        let next = self.current() - 1;
        self.store.update_quantity(&self.medicine_id, next).await?;
        Ok(self.settled())
    }

    fn supports_set_quantity(&self) -> bool {
        true
    }

    async fn set_quantity(&self, quantity: i64) -> ClientResult<i64> {
        self.store.update_quantity(&self.medicine_id, quantity).await?;
        Ok(self.settled())
    }

    fn supports_remove(&self) -> bool {
        true
    }

    async fn remove(&self) -> ClientResult<i64> {
        self.store.remove_from_cart(&self.medicine_id).await?;
        Ok(self.settled())
    }
}
