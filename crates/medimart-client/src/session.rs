//! # Storefront Session
//!
//! The application-lifetime context every screen is built from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Storefront                                     │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ StorefrontApi│  │ TokenStore   │  │ CartEvents   │  │ Address    │  │
//! │  │ (shared)     │  │ (shared)     │  │ (shared bus) │  │ Selection  │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  cart_store() ──► a fresh CartStore per screen (never shared)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use medimart_core::{AuthToken, PricingPolicy, Profile, Registration};
use std::sync::Arc;
use tracing::info;

use crate::api::{HttpApi, StorefrontApi};
use crate::auth::TokenStore;
use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::events::CartEvents;
use crate::mailbox::AddressSelection;

#[derive(Clone)]
pub struct Storefront {
    api: Arc<dyn StorefrontApi>,
    tokens: Arc<TokenStore>,
    events: CartEvents,
    address_selection: AddressSelection,
    pricing: PricingPolicy,
}

impl Storefront {
    /// Wires an HTTP-backed session from validated configuration.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let tokens = Arc::new(TokenStore::new(config.token_path()));
        let api = HttpApi::new(config, Arc::clone(&tokens))?;
        info!(base_url = %config.api.base_url, "Storefront session ready");
        Ok(Self::new(Arc::new(api), tokens, config.pricing))
    }

    pub fn new(api: Arc<dyn StorefrontApi>, tokens: Arc<TokenStore>, pricing: PricingPolicy) -> Self {
        Storefront {
            api,
            tokens,
            events: CartEvents::new(),
            address_selection: AddressSelection::new(),
            pricing,
        }
    }

    pub fn api(&self) -> &Arc<dyn StorefrontApi> {
        &self.api
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn events(&self) -> &CartEvents {
        &self.events
    }

    pub fn address_selection(&self) -> &AddressSelection {
        &self.address_selection
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// A new, empty cart view for one screen.
    pub fn cart_store(&self) -> Arc<CartStore> {
        Arc::new(CartStore::new(Arc::clone(&self.api), Arc::clone(&self.tokens)))
    }

    /// Signs in, keeps the token, and tells cart views to reload.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Profile> {
        let token = self.api.login(username, password).await?;
        Ok(self.start(token, "Signed in"))
    }

    /// Creates an account and signs it in.
    pub async fn register(&self, registration: &Registration) -> ClientResult<Profile> {
        let token = self.api.register(registration).await?;
        Ok(self.start(token, "Registered"))
    }

    fn start(&self, token: AuthToken, message: &str) -> Profile {
        self.tokens.set(token.access_token);
        info!(username = %token.user.username, "{}", message);
        self.events.emit();
        token.user
    }

    /// Drops the token; cart views reload to empty.
    pub fn logout(&self) {
        self.tokens.clear();
        info!("Signed out");
        self.events.emit();
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("authenticated", &self.is_authenticated())
            .field("events", &self.events)
            .field("pricing", &self.pricing)
            .finish()
    }
}
