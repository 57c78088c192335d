//! API routes

pub mod account;
pub mod clients;
pub mod plans;

use axum::{
    handler::Handler,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{auth::require_auth, quota::require_client_quota, state::AppState};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    // Only creation is gated; listing stays available at the limit
    let gated_create = clients::create_client.layer(middleware::from_fn_with_state(
        state.billing.quota.clone(),
        require_client_quota,
    ));

    let protected = Router::new()
        .route(
            "/api/v1/clients",
            get(clients::list_clients).post(gated_create),
        )
        .route("/api/v1/clients/{id}", get(clients::get_client))
        .route("/api/v1/account", get(account::get_account))
        .route("/api/v1/account/quota", get(account::get_quota))
        .route("/api/v1/plans/validate", post(plans::validate_privileges))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
