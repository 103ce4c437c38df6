//! # Pricing Calculator
//!
//! Derives the totals shown on the cart and checkout screens.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Calculation                                │
//! │                                                                         │
//! │  Cart snapshot + medicine records                                       │
//! │       │                                                                 │
//! │       ├──► mrp_total  = Σ (medicine.mrp × item.quantity)                │
//! │       │                  (captured item.price when no record matches)   │
//! │       │                                                                 │
//! │       ├──► subtotal   = cart.total_amount   (server-authoritative)      │
//! │       │                                                                 │
//! │       ├──► discount   = mrp_total − subtotal (signed, may be < 0)       │
//! │       │                                                                 │
//! │       ├──► handling   = 0 if subtotal ≥ ₹500 else ₹20                   │
//! │       ├──► delivery   = 0 if subtotal ≥ ₹300 else ₹40                   │
//! │       │                                                                 │
//! │       └──► grand_total = subtotal + handling + delivery                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is integer paise, so the ₹300.00 and ₹500.00 boundaries
//! compare exactly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Cart, CartItem, Medicine};

// =============================================================================
// Pricing Policy
// =============================================================================

/// Fee thresholds applied to the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Subtotal at or above which the handling charge is waived.
    pub handling_threshold: Money,
    pub handling_charge: Money,
    /// Subtotal at or above which delivery is free.
    pub delivery_threshold: Money,
    pub delivery_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            handling_threshold: Money::from_rupees(500),
            handling_charge: Money::from_rupees(20),
            delivery_threshold: Money::from_rupees(300),
            delivery_fee: Money::from_rupees(40),
        }
    }
}

impl PricingPolicy {
    pub fn handling_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.handling_threshold {
            Money::zero()
        } else {
            self.handling_charge
        }
    }

    pub fn delivery_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.delivery_threshold {
            Money::zero()
        } else {
            self.delivery_fee
        }
    }
}

// =============================================================================
// Pricing Breakdown
// =============================================================================

/// Totals derived from a cart snapshot. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingBreakdown {
    #[ts(type = "number")]
    pub mrp_total: Money,
    #[ts(type = "number")]
    pub subtotal: Money,
    /// `mrp_total - subtotal`. Negative when a live MRP has dropped below
    /// the price captured in the cart.
    #[ts(type = "number")]
    pub discount: Money,
    #[ts(type = "number")]
    pub handling_charge: Money,
    #[ts(type = "number")]
    pub delivery_fee: Money,
    #[ts(type = "number")]
    pub grand_total: Money,
}

impl PricingBreakdown {
    /// Computes the breakdown for `cart` using the matching `medicines`.
    pub fn compute(cart: &Cart, medicines: &[Medicine], policy: &PricingPolicy) -> Self {
        Self::from_parts(&cart.items, cart.total_amount, medicines, policy)
    }

    /// Breakdown for a possibly-absent cart; an absent cart prices as empty.
    pub fn for_cart(cart: Option<&Cart>, medicines: &[Medicine], policy: &PricingPolicy) -> Self {
        match cart {
            Some(cart) => Self::compute(cart, medicines, policy),
            None => Self::from_parts(&[], Money::zero(), medicines, policy),
        }
    }

    fn from_parts(
        items: &[CartItem],
        subtotal: Money,
        medicines: &[Medicine],
        policy: &PricingPolicy,
    ) -> Self {
        let mrp_total: Money = items
            .iter()
            .map(|item| unit_mrp(item, medicines).multiply_quantity(item.quantity))
            .sum();

        let handling_charge = policy.handling_for(subtotal);
        let delivery_fee = policy.delivery_for(subtotal);

        PricingBreakdown {
            mrp_total,
            subtotal,
            discount: mrp_total - subtotal,
            handling_charge,
            delivery_fee,
            grand_total: subtotal + handling_charge + delivery_fee,
        }
    }

    /// Discount for display, never below zero.
    pub fn savings(&self) -> Money {
        self.discount.clamp_non_negative()
    }
}

/// MRP for one line: the medicine record's MRP, or the captured price when
/// the record is missing.
fn unit_mrp(item: &CartItem, medicines: &[Medicine]) -> Money {
    medicines
        .iter()
        .find(|m| m.id == item.medicine_id)
        .map(|m| m.mrp)
        .unwrap_or(item.price)
}

// =============================================================================
// Line Totals
// =============================================================================

/// Display totals for one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// Captured price × quantity.
    pub total: Money,
    /// MRP × quantity, set only when the MRP exceeds the captured price.
    pub struck_mrp_total: Option<Money>,
}

/// Totals for one cart line given its (optional) medicine record.
pub fn line_totals(item: &CartItem, medicine: Option<&Medicine>) -> LineTotals {
    let total = item.line_total();
    let struck_mrp_total = medicine
        .filter(|m| m.mrp > item.price)
        .map(|m| m.mrp.multiply_quantity(item.quantity));
    LineTotals {
        total,
        struck_mrp_total,
    }
}

// =============================================================================
// Minimum Order
// =============================================================================

/// Checks the cart subtotal against the pharmacy's minimum order amount.
pub fn check_minimum_order(subtotal: Money, minimum: Money) -> CoreResult<()> {
    if subtotal < minimum {
        return Err(CoreError::BelowMinimumOrder { minimum, subtotal });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
