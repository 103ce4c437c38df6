//! Ordering commands.

use anyhow::Context;
use medimart_client::screens::CheckoutScreen;
use medimart_client::Storefront;
use medimart_core::PaymentMethod;

use super::{print_bill, require_login};

pub async fn checkout(
    session: &Storefront,
    phone: String,
    address_id: Option<String>,
    payment: PaymentMethod,
) -> anyhow::Result<()> {
    require_login(session)?;
    if let Some(id) = address_id {
        session.address_selection().select(id);
    }

    let mut screen = CheckoutScreen::new(session);
    screen.load().await.context("failed to load checkout")?;
    screen.phone = phone;
    screen.payment_method = payment;

    if let Some(bill) = screen.pricing() {
        print_bill(&bill);
    }
    let order = screen.place_order().await.context("order not placed")?;

    println!("Order {} placed", order.id);
    println!("  Deliver to: {}", order.delivery_address);
    println!("  Payment:    {} ({})", order.payment_method, order.payment_status);
    if payment == PaymentMethod::Online {
        println!("  Complete the online payment to confirm the order");
    }
    Ok(())
}

pub async fn list(session: &Storefront) -> anyhow::Result<()> {
    require_login(session)?;
    let orders = session.api().list_orders().await.context("failed to list orders")?;

    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }
    for o in orders {
        println!(
            "{:<12} {} {:<18} {:>10} {}",
            o.id,
            o.created_at.format("%d %b %Y %H:%M"),
            o.status.label(),
            o.total_amount.to_string(),
            o.payment_method
        );
    }
    Ok(())
}
