//! Lavanderia API Library
//!
//! Core functionality for the laundry-service ordering backend: catalog,
//! cart, orders, deliveries, payments, ratings, and the admin console.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod services;
pub mod tracing;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthRouterExt;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// The versioned API surface: user routes behind bearer auth, the admin
/// console additionally behind the admin role.
pub fn api_v1_routes() -> Router<AppState> {
    let user_routes = Router::new()
        .route("/categories", get(handlers::catalog::list_categories))
        .route(
            "/cart",
            get(handlers::cart::get_cart).post(handlers::cart::add_to_cart),
        )
        .route("/cart/clear", delete(handlers::cart::clear_cart))
        .route(
            "/cart/{order_item_id}",
            delete(handlers::cart::remove_from_cart),
        )
        .route(
            "/orders/{id}/delivery",
            post(handlers::deliveries::create_delivery),
        )
        .route("/orders/{id}/pay", post(handlers::orders::pay_order))
        .route("/orders/{id}/cancel", post(handlers::orders::cancel_order))
        .route("/orders/{id}/rating", post(handlers::orders::rate_order))
        .route("/historial", get(handlers::orders::order_history))
        .with_auth();

    let admin_routes = handlers::admin::admin_routes().with_role("admin");

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(user_routes)
        .nest("/admin", admin_routes)
}

/// Builds the full application router with its middleware stack.
///
/// Request flow: request-id, auth-service injection, trace span, then the
/// per-route auth layers. CORS and compression are bolted on by `main`.
pub fn app_router(app_state: AppState, auth_service: Arc<auth::AuthService>) -> Router {
    Router::new()
        .route("/", get(|| async { "lavanderia-api up" }))
        .nest("/api/v1", api_v1_routes())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        .layer(axum::middleware::from_fn(
            crate::tracing::request_id_middleware,
        ))
        .with_state(app_state)
}

async fn inject_auth_service(
    State(auth): State<Arc<auth::AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

async fn api_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "lavanderia-api",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
