//! Shared application state.

use stockroom_db::Database;

/// Handed to every handler through axum's `State` extractor.
///
/// `Database` wraps a cloneable pool, so cloning the state per request is
/// cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
