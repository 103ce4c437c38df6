//! # Cart Event Bus
//!
//! In-process "the server-side cart changed, re-fetch" signal.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart Event Bus                                 │
//! │                                                                         │
//! │  Screen mounts ──► subscribe(listener) ──► Subscription                 │
//! │                                                │                        │
//! │  Mutation succeeds ──► emit()                  │ drop / unsubscribe()   │
//! │                          │                     ▼                        │
//! │                          │               listener removed               │
//! │                          ▼                                              │
//! │            ┌──────────────────────────┐                                 │
//! │            │ snapshot listeners       │  (lock released before calls)   │
//! │            │ call each in order       │                                 │
//! │            │ panics caught per call   │                                 │
//! │            └──────────────────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The signal carries no payload. Listeners only learn that they should
//! reload; the server holds the truth.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Process-wide cart change notifier. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct CartEvents {
    registry: Arc<Mutex<Registry>>,
}

impl CartEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Every call creates an independent registration,
    /// even for the same closure.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().expect("Event registry mutex poisoned");
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every registered listener once, in registration order.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    /// Returns the number of listeners that completed normally.
    pub fn emit(&self) -> usize {
        let snapshot: Vec<Listener> = {
            let registry = self.registry.lock().expect("Event registry mutex poisoned");
            registry.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        let mut completed = 0;
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener())) {
                Ok(()) => completed += 1,
                Err(_) => warn!("Cart event listener panicked"),
            }
        }
        completed
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .lock()
            .expect("Event registry mutex poisoned")
            .listeners
            .len()
    }
}

impl fmt::Debug for CartEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle for one registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            // Never panic in drop.
            let mut registry = match registry.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
