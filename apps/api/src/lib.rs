//! # Stockroom API
//!
//! HTTP interface over the Stockroom inventory and sales store.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST   /clients              201   register a client                   │
//! │  GET    /clients              200   ?name&phone&page&limit              │
//! │  GET    /clients/{id}         200 / 404                                 │
//! │  PATCH  /clients/{id}         200 / 404                                 │
//! │  DELETE /clients/{id}         204 / 404                                 │
//! │                                                                         │
//! │  POST   /products             201   receive stock (create or add)       │
//! │  GET    /products             200   ?name&supplier_id&supplier_code     │
//! │                                      &min_price&max_price&page&limit    │
//! │  GET    /products/{id}        200 / 404                                 │
//! │  PATCH  /products/{id}        200 / 404                                 │
//! │  DELETE /products/{id}        204 / 404                                 │
//! │                                                                         │
//! │  POST   /sales                201   header + items, one transaction     │
//! │  GET    /sales                200   ?client_name&product_name&total     │
//! │                                      &sale_date&payment_date            │
//! │                                      &payment_status&page&limit         │
//! │  GET    /sales/{id}           200 / 404                                 │
//! │  DELETE /sales/{id}           204 / 404                                 │
//! │                                                                         │
//! │  GET    /health               200                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors use one body shape, `{"code": "...", "message": "..."}`
//! (see [`error::ApiError`]).

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

use handlers::{client, product, sale};

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/clients",
            post(client::create_client).get(client::list_clients),
        )
        .route(
            "/clients/{id}",
            get(client::get_client)
                .patch(client::update_client)
                .delete(client::delete_client),
        )
        .route(
            "/products",
            post(product::receive_product).get(product::list_products),
        )
        .route(
            "/products/{id}",
            get(product::get_product)
                .patch(product::update_product)
                .delete(product::delete_product),
        )
        .route("/sales", post(sale::create_sale).get(sale::list_sales))
        .route(
            "/sales/{id}",
            get(sale::get_sale).delete(sale::delete_sale),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
