use std::sync::Arc;

use sea_orm::DatabaseConnection;

// Shared only behind `Arc`; the connection itself is never cloned.
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self { db })
    }
}
