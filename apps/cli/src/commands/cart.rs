//! Cart commands.

use anyhow::Context;
use medimart_client::screens::{CartScreen, MedicineScreen};
use medimart_client::Storefront;
use tracing::warn;

use super::{print_bill, require_login};

pub async fn show(session: &Storefront) -> anyhow::Result<()> {
    require_login(session)?;
    let mut screen = CartScreen::new(session);
    screen.load().await.context("failed to load cart")?;
    render(&screen);
    Ok(())
}

fn render(screen: &CartScreen) {
    if !screen.is_checkoutable() {
        println!("Your cart is empty");
        return;
    }

    println!("Cart ({} items)", screen.snapshot().item_count);
    for line in screen.lines() {
        let name = line
            .medicine
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or(line.item.medicine_id.as_str());
        let struck = line
            .totals
            .struck_mrp_total
            .map(|m| format!("(MRP {})", m))
            .unwrap_or_default();
        println!(
            "  {:<32} x{:<3} {:>10} {}",
            name,
            line.item.quantity,
            line.totals.total.to_string(),
            struck
        );
    }

    match screen.delivery_address() {
        Some(address) => println!("Deliver to {}: {}", address.label, address.one_line()),
        None => println!("No saved delivery address"),
    }
    if let Some(bill) = screen.pricing() {
        println!("Bill details");
        print_bill(&bill);
    }
}

pub async fn add(session: &Storefront, medicine_id: &str, quantity: i64) -> anyhow::Result<()> {
    require_login(session)?;
    let store = session.cart_store();
    store
        .add_to_cart(medicine_id, quantity)
        .await
        .with_context(|| format!("failed to add {}", medicine_id))?;
    session.events().emit();

    println!(
        "{} x{} in cart ({} items)",
        medicine_id,
        store.get_item_quantity(medicine_id),
        store.item_count()
    );
    Ok(())
}

pub async fn set(session: &Storefront, medicine_id: &str, quantity: i64) -> anyhow::Result<()> {
    require_login(session)?;
    let screen = MedicineScreen::new(session, medicine_id);
    screen
        .set_quantity(quantity)
        .await
        .with_context(|| format!("failed to set {} to {}", medicine_id, quantity))?;

    match screen.quantity() {
        0 => println!("{} removed from cart", medicine_id),
        q => println!("{} x{} in cart", medicine_id, q),
    }
    Ok(())
}

pub async fn remove(session: &Storefront, medicine_id: &str) -> anyhow::Result<()> {
    require_login(session)?;
    MedicineScreen::new(session, medicine_id)
        .remove()
        .await
        .with_context(|| format!("failed to remove {}", medicine_id))?;
    println!("{} removed from cart", medicine_id);
    Ok(())
}

pub async fn clear(session: &Storefront) -> anyhow::Result<()> {
    require_login(session)?;
    session.cart_store().clear().await.context("failed to clear cart")?;
    session.events().emit();
    println!("Cart cleared");
    Ok(())
}

/// Hands the address to the cart screen through the session mailbox and
/// shows the cart with it.
pub async fn select_address(session: &Storefront, address_id: String) -> anyhow::Result<()> {
    require_login(session)?;
    session.address_selection().select(address_id.clone());

    let mut screen = CartScreen::new(session);
    screen.load().await.context("failed to load cart")?;
    if screen.delivery_address().map(|a| a.id.as_str()) != Some(address_id.as_str()) {
        warn!(address_id = %address_id, "Address not found, using default");
    }
    render(&screen);
    Ok(())
}
