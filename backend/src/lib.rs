//! # Secret Valentine backend
//!
//! Card lifecycle engine and HTTP surface for the Secret Valentine app.
//!
//! The crate is layered the same way top to bottom:
//!
//! - **REST** (`rest`): axum handlers mapping HTTP to domain operations
//! - **Domain** (`domain`): the lifecycle engine, session state and card
//!   operations
//! - **Storage** (`storage`): the card store abstraction and its in-memory
//!   implementation
//!
//! Everything recipient-facing goes through the lifecycle engine, so the
//! redaction rules (time lock, anonymous sender) live in exactly one place.

pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use config::ServerConfig;
use domain::{CardService, ProfileService};
use notify::Notifier;
use storage::{CardStorage, MemoryCardStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub card_service: CardService,
    pub profile_service: ProfileService,
    pub admin_token: Option<String>,
}

/// Wire up the store, notifier and services from configuration
pub fn initialize_backend(config: &ServerConfig) -> AppState {
    info!(seed = config.seed_demo_data, "Setting up card store");
    let store: Arc<dyn CardStorage> = if config.seed_demo_data {
        Arc::new(MemoryCardStore::with_demo_data())
    } else {
        Arc::new(MemoryCardStore::new())
    };

    let notifier = Notifier::new(
        &config.bot_username,
        config.notify_latency,
        config.notify_timeout,
    );

    info!("Setting up domain services");
    let card_service = CardService::new(Arc::clone(&store), notifier, config.promo_unlock_at);
    let profile_service = ProfileService::new(store, &config.bot_username);

    AppState {
        card_service,
        profile_service,
        admin_token: config.admin_token.clone(),
    }
}

/// Build the application router with CORS for the web client
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .nest("/api", rest::api_routes())
        .layer(cors)
        .with_state(state)
}
