//! REST API over a completed registry and event load.
//!
//! Provides two GET endpoints:
//! - `/vpps`: registered VPPs with site and battery counts
//! - `/report`: settlement report for one VPP and month

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::registry::Registry;
use crate::settlement::MeterEvent;

pub use types::{ErrorResponse, ReportQuery, VppSummary};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after ingestion completes and wrapped in `Arc`. No
/// locks are needed since nothing mutates after startup, so concurrent
/// report requests always see the fully populated registry.
pub struct AppState {
    /// Registry populated at startup.
    pub registry: Registry,
    /// Metering events loaded at startup, bound fresh per request.
    pub events: Vec<MeterEvent>,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/vpps", get(handlers::get_vpps))
        .route("/report", get(handlers::get_report))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
