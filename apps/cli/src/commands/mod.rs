//! # CLI Commands
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── Shared rendering and guards
//! ├── auth.rs     ◄─── Login, register, logout
//! ├── catalog.rs  ◄─── Pharmacies, medicines, reviews
//! ├── cart.rs     ◄─── Cart display and mutations
//! ├── care.rs     ◄─── Lab tests, consultations
//! └── order.rs    ◄─── Checkout, order history
//! ```
//!
//! Every command builds the screen view-model it needs from the shared
//! [`Storefront`] and prints the result to stdout. Logs go to stderr.

pub mod auth;
pub mod care;
pub mod cart;
pub mod catalog;
pub mod order;

use anyhow::bail;
use medimart_client::Storefront;
use medimart_core::PricingBreakdown;

/// Fails early with a friendly message when no token is stored.
pub(crate) fn require_login(session: &Storefront) -> anyhow::Result<()> {
    if !session.is_authenticated() {
        bail!("Please login first: medimart login <username> --password <password>");
    }
    Ok(())
}

pub(crate) fn print_bill(bill: &PricingBreakdown) {
    println!("  {:<20} {:>12}", "Item total (MRP)", bill.mrp_total.to_string());
    if bill.savings().is_positive() {
        println!("  {:<20} {:>12}", "Discount", format!("-{}", bill.savings()));
    }
    println!("  {:<20} {:>12}", "Handling charge", free_or(bill.handling_charge));
    println!("  {:<20} {:>12}", "Delivery fee", free_or(bill.delivery_fee));
    println!("  {:<20} {:>12}", "To pay", bill.grand_total.to_string());
}

fn free_or(amount: medimart_core::Money) -> String {
    if amount.is_zero() {
        "FREE".to_string()
    } else {
        amount.to_string()
    }
}
