//! Catalog Server
//!
//! HTTP boundary for the product catalog: translates requests into
//! [`ProductRepository`] calls and outcomes into status codes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use catalog_core::{CacheFacade, ProductRepository};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductRepository>,
    pub cache: Arc<CacheFacade>,
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Products
        .route("/products", post(handlers::products::create))
        .route(
            "/products/:id",
            get(handlers::products::get).put(handlers::products::update),
        )
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
