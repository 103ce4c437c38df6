//! One-shot handoff of the delivery address the user picked on the
//! address screen to whichever screen reads it next.

use std::sync::{Arc, Mutex};
use tracing::debug;

/// Single-slot mailbox. Writing overwrites; reading clears.
#[derive(Debug, Clone, Default)]
pub struct AddressSelection {
    slot: Arc<Mutex<Option<String>>>,
}

impl AddressSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves `address_id` for the next reader, replacing any unread value.
    pub fn select(&self, address_id: impl Into<String>) {
        let address_id = address_id.into();
        debug!(address_id = %address_id, "Address selected");
        *self.slot.lock().expect("Address mailbox mutex poisoned") = Some(address_id);
    }

    /// Consumes the pending selection. A second call returns `None`.
    pub fn take(&self) -> Option<String> {
        self.slot.lock().expect("Address mailbox mutex poisoned").take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().expect("Address mailbox mutex poisoned").is_some()
    }
}
