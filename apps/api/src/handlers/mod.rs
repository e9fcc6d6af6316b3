//! # HTTP Handlers
//!
//! One module per resource. Handlers decode the request, hand validated
//! values to a repository and translate the outcome; they hold no business
//! rules of their own.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /clients    ──► client::*    ──► db.clients()                          │
//! │  /products   ──► product::*   ──► db.products()                         │
//! │  /sales      ──► sale::*      ──► db.sales()                            │
//! │  /health     ──► health       ──► db.health_check()                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod product;
pub mod sale;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.db.health_check().await;
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, send};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app().await;
        let (status, _) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
