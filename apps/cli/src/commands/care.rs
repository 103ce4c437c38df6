//! Lab test and consultation bookings.

use anyhow::Context;
use medimart_client::Storefront;

use super::require_login;

pub async fn lab_tests(session: &Storefront) -> anyhow::Result<()> {
    require_login(session)?;
    let tests = session.api().list_lab_tests().await.context("failed to list lab tests")?;

    if tests.is_empty() {
        println!("No lab tests booked");
        return Ok(());
    }
    for t in tests {
        println!(
            "{:<12} {} {:<24} {:<20} {:<10} {:>10}",
            t.id,
            t.scheduled_date.format("%d %b %Y %H:%M"),
            t.test_name,
            t.lab_name,
            t.status.label(),
            t.price.to_string()
        );
        if let Some(url) = &t.results_url {
            println!("             results: {}", url);
        }
    }
    Ok(())
}

pub async fn consultations(session: &Storefront) -> anyhow::Result<()> {
    require_login(session)?;
    let consultations = session
        .api()
        .list_consultations()
        .await
        .context("failed to list consultations")?;

    if consultations.is_empty() {
        println!("No consultations booked");
        return Ok(());
    }
    for c in consultations {
        println!(
            "{:<12} {} {:<20} {:<16} {:>3} min {:<10} {:>10}",
            c.id,
            c.scheduled_date.format("%d %b %Y %H:%M"),
            c.doctor_name,
            c.specialization,
            c.duration_minutes,
            c.status.label(),
            c.price.to_string()
        );
        if let Some(diagnosis) = &c.diagnosis {
            println!("             diagnosis: {}", diagnosis);
        }
    }
    Ok(())
}
