//! Backend for a single-event wedding site.
//!
//! The site itself (pages, animation, registry catalog) is static; this service owns
//! the one path with a correctness invariant, the RSVP submission flow, plus two small
//! registry/settings endpoints.
//!
//!
//!
//! # Endpoints
//!
//! - `POST /rsvp/search` — look up an invitation by guest name
//! - `POST /rsvp/submit` — one-shot RSVP submission for a party
//! - `POST /registry/mark-purchased` — claim a registry item
//! - `GET /settings/shipping-address` — shipping address for registry gifts
//!
//!
//!
//! # One submission per party
//!
//! A party may respond exactly once. Two browsers submitting the same invitation at
//! the same time must not both succeed, and requests may land on different processes,
//! so the gate lives in the store: a conditional write that flips `has_responded`
//! only while it is still false, with the affected count inspected. The loser gets
//! `409 Conflict`, which is an expected outcome, not a fault.
//!
//! Guest rows are only written after every submitted guest id has been checked
//! against the party's true guest set, so the party gate is the only contended
//! resource.
//!
//!
//!
//! # Store
//!
//! Handlers talk to the store through the traits in [`store`]. The production
//! backend is Redis ([`store::redis`], conditional writes as Lua scripts); an
//! in-memory backend ([`store::memory`]) substitutes for it in tests and local
//! development via `RSVP_STORE=memory`.
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod routes;
pub mod rsvp;
pub mod state;
pub mod store;
pub mod utils;

use routes::{mark_purchased_handler, search_handler, shipping_address_handler, submit_handler};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/rsvp/search", post(search_handler))
        .route("/rsvp/submit", post(submit_handler))
        .route("/registry/mark-purchased", post(mark_purchased_handler))
        .route("/settings/shipping-address", get(shipping_address_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
