//! Session commands.

use anyhow::Context;
use medimart_client::Storefront;
use medimart_core::validation::{validate_email, validate_phone};
use medimart_core::{Profile, Registration};

pub async fn login(session: &Storefront, username: &str, password: &str) -> anyhow::Result<()> {
    let user = session
        .login(username, password)
        .await
        .context("login failed")?;
    println!("Signed in as {}", display_name(&user));
    Ok(())
}

pub async fn register(session: &Storefront, registration: Registration) -> anyhow::Result<()> {
    validate_email(registration.email.trim())?;
    validate_phone(registration.phone.trim())?;
    let user = session
        .register(&registration)
        .await
        .context("registration failed")?;
    println!("Welcome, {}", display_name(&user));
    Ok(())
}

fn display_name(user: &Profile) -> &str {
    if user.full_name.trim().is_empty() {
        &user.username
    } else {
        &user.full_name
    }
}

pub fn logout(session: &Storefront) -> anyhow::Result<()> {
    session.logout();
    println!("Signed out");
    Ok(())
}
