//! # MediMart Command-Line Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        medimart (binary)                                │
//! │                                                                         │
//! │  main.rs ────► logging, config, Storefront session, dispatch            │
//! │                                                                         │
//! │  commands/ ──► auth     (login, register, logout)                       │
//! │                catalog  (pharmacies, medicines, review)                 │
//! │                cart     (cart, add, set, remove, clear, select-address) │
//! │                care     (lab-tests, consultations)                      │
//! │                order    (checkout, orders)                              │
//! │                                                                         │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  medimart-client screens ──► HttpApi ──► storefront backend             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (logging)
//! 3. Load client configuration (file, environment, `--base-url`)
//! 4. Build the Storefront session
//! 5. Run one command

use anyhow::Context;
use clap::{Parser, Subcommand};
use medimart_client::{ClientConfig, Storefront};
use medimart_core::{PaymentMethod, Registration};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "medimart", about = "Order medicines from nearby pharmacies", long_about = None)]
struct Cli {
    /// Path to client.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend URL, overriding the config file and environment
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and keep the access token
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the access token
    Logout,
    /// List pharmacies, optionally near a location
    Pharmacies {
        #[arg(long, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
        /// Search radius in km
        #[arg(long)]
        radius: Option<f64>,
    },
    /// List a pharmacy's medicines with cart quantities
    Medicines { pharmacy_id: String },
    /// Rate a medicine from 1 to 5
    Review {
        medicine_id: String,
        rating: f64,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Show the cart, delivery address and bill
    Cart,
    /// Add a medicine to the cart
    Add {
        medicine_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set a cart line's quantity (0 removes it)
    Set {
        medicine_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a medicine from the cart
    Remove { medicine_id: String },
    /// Empty the cart
    Clear,
    /// Pick a saved address and show the cart with it
    SelectAddress { address_id: String },
    /// Place an order for the current cart
    Checkout {
        #[arg(long)]
        phone: String,
        /// Saved address id to deliver to
        #[arg(long)]
        address: Option<String>,
        #[arg(long, default_value = "cod", value_parser = parse_payment)]
        payment: PaymentMethod,
    },
    /// List past orders
    Orders,
    /// List booked lab tests
    LabTests,
    /// List booked doctor consultations
    Consultations,
}

fn parse_payment(s: &str) -> Result<PaymentMethod, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ClientConfig::load_or_default(cli.config.clone());
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    let session = Storefront::from_config(&config).context("invalid client configuration")?;
    debug!(base_url = %config.api.base_url, "Session ready");

    match cli.command {
        Command::Login { username, password } => commands::auth::login(&session, &username, &password).await,
        Command::Register {
            username,
            email,
            full_name,
            phone,
            password,
        } => {
            let registration = Registration {
                username,
                email,
                full_name,
                phone,
                password,
            };
            commands::auth::register(&session, registration).await
        }
        Command::Logout => commands::auth::logout(&session),
        Command::Pharmacies { lat, lon, radius } => {
            commands::catalog::pharmacies(&session, lat.zip(lon), radius).await
        }
        Command::Medicines { pharmacy_id } => commands::catalog::medicines(&session, &pharmacy_id).await,
        Command::Review {
            medicine_id,
            rating,
            comment,
        } => commands::catalog::review(&session, &medicine_id, rating, &comment).await,
        Command::Cart => commands::cart::show(&session).await,
        Command::Add { medicine_id, quantity } => commands::cart::add(&session, &medicine_id, quantity).await,
        Command::Set { medicine_id, quantity } => commands::cart::set(&session, &medicine_id, quantity).await,
        Command::Remove { medicine_id } => commands::cart::remove(&session, &medicine_id).await,
        Command::Clear => commands::cart::clear(&session).await,
        Command::SelectAddress { address_id } => commands::cart::select_address(&session, address_id).await,
        Command::Checkout {
            phone,
            address,
            payment,
        } => commands::order::checkout(&session, phone, address, payment).await,
        Command::Orders => commands::order::list(&session).await,
        Command::LabTests => commands::care::lab_tests(&session).await,
        Command::Consultations => commands::care::consultations(&session).await,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=medimart=trace` - Show trace for medimart crates only
/// - Default: `info,medimart=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,medimart=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_checkout() {
        let cli = Cli::try_parse_from([
            "medimart", "checkout", "--phone", "9876543210", "--payment", "online",
        ])
        .unwrap();
        match cli.command {
            Command::Checkout { phone, address, payment } => {
                assert_eq!(phone, "9876543210");
                assert!(address.is_none());
                assert_eq!(payment, PaymentMethod::Online);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_quantity() {
        let cli = Cli::try_parse_from(["medimart", "set", "m1", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Set { quantity: -1, .. }));
    }

    #[test]
    fn test_parse_register_and_review() {
        let cli = Cli::try_parse_from([
            "medimart", "register", "ravi", "--email", "ravi@example.com", "--full-name", "Ravi Kumar",
            "--phone", "9876543210", "-p", "pw",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Register { ref full_name, .. } if full_name == "Ravi Kumar"));

        let cli = Cli::try_parse_from(["medimart", "review", "m1", "4.5"]).unwrap();
        match cli.command {
            Command::Review { medicine_id, rating, comment } => {
                assert_eq!(medicine_id, "m1");
                assert_eq!(rating, 4.5);
                assert!(comment.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_location_needs_both_coordinates() {
        assert!(Cli::try_parse_from(["medimart", "pharmacies", "--lat", "12.9"]).is_err());
    }
}
