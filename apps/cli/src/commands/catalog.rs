//! Browsing commands.

use anyhow::Context;
use medimart_client::screens::PharmacyScreen;
use medimart_client::{GeoQuery, Storefront};
use medimart_core::validation::validate_rating;

use super::require_login;

pub async fn pharmacies(
    session: &Storefront,
    near: Option<(f64, f64)>,
    radius_km: Option<f64>,
) -> anyhow::Result<()> {
    let query = near.map(|(latitude, longitude)| GeoQuery {
        latitude,
        longitude,
        radius_km,
    });
    let pharmacies = session
        .api()
        .list_pharmacies(query)
        .await
        .context("failed to list pharmacies")?;

    if pharmacies.is_empty() {
        println!("No pharmacies found");
        return Ok(());
    }
    for p in pharmacies {
        let distance = p.distance.map(|d| format!("{:.1} km", d)).unwrap_or_default();
        let open = if p.is_open { "open" } else { "closed" };
        println!(
            "{:<12} {:<32} {:>3.1}* min {:<10} {:<8} {}",
            p.id,
            p.name,
            p.rating,
            p.minimum_order.to_string(),
            open,
            distance
        );
    }
    Ok(())
}

pub async fn medicines(session: &Storefront, pharmacy_id: &str) -> anyhow::Result<()> {
    let mut screen = PharmacyScreen::new(session, pharmacy_id);
    screen
        .load()
        .await
        .with_context(|| format!("failed to load pharmacy {}", pharmacy_id))?;

    if let Some(pharmacy) = screen.pharmacy() {
        println!("{} ({})", pharmacy.name, pharmacy.delivery_time);
    }
    for m in screen.medicines() {
        let mrp = if m.is_marked_down() {
            format!("MRP {}", m.mrp)
        } else {
            String::new()
        };
        let rx = if m.prescription_required { "Rx" } else { "" };
        let in_cart = match screen.quantity_of(&m.id) {
            0 => String::new(),
            q => format!("{} added", q),
        };
        println!(
            "{:<12} {:<32} {:>10} {:<14} stock {:<4} {:<3} {}",
            m.id,
            m.name,
            m.price.to_string(),
            mrp,
            m.stock_quantity,
            rx,
            in_cart
        );
    }
    if let Some(badge) = screen.cart_badge() {
        println!("Cart: {}", badge);
    }
    Ok(())
}

pub async fn review(session: &Storefront, medicine_id: &str, rating: f64, comment: &str) -> anyhow::Result<()> {
    require_login(session)?;
    validate_rating(rating)?;
    let review = session
        .api()
        .add_review(medicine_id, rating, comment)
        .await
        .context("review not saved")?;
    println!("Rated {} {:.1}*", review.medicine_id, review.rating);
    Ok(())
}
