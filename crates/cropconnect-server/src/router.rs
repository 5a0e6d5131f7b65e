// SPDX-License-Identifier: Apache-2.0

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::request_tracing::{request_timeout_middleware, request_tracing_middleware};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/readyz", get(handlers::readyz_handler))
        .route("/v1/version", get(handlers::version_handler))
        .route("/v1/openapi.json", get(handlers::openapi_handler))
        .route("/v1/auth/register", post(handlers::register_handler))
        .route("/v1/auth/login", post(handlers::login_handler))
        .route("/v1/auth/session", get(handlers::session_handler))
        .route(
            "/v1/listings",
            get(handlers::list_listings_handler).post(handlers::create_listing_handler),
        )
        .route(
            "/v1/listings/:id",
            get(handlers::get_listing_handler).delete(handlers::delete_listing_handler),
        )
        .route("/v1/farmer/listings", get(handlers::farmer_listings_handler))
        .route("/v1/farmer/profile", get(handlers::farmer_profile_handler))
        .route(
            "/v1/contracts",
            get(handlers::list_contracts_handler).post(handlers::create_contract_handler),
        )
        .route(
            "/v1/contracts/:id",
            get(handlers::get_contract_handler).patch(handlers::transition_contract_handler),
        )
        .fallback(handlers::route_not_found_handler)
        .layer(from_fn_with_state(state.clone(), request_timeout_middleware))
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
