//! Shared setup for database-backed API tests. Expects a reachable
//! PostgreSQL instance (DATABASE_URL, or the development default) and
//! applies the crate's migrations before handing out state.

use actix_web::web;
use bookshelf_server::{AppState, Settings};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

pub async fn test_state() -> web::Data<AppState> {
    let mut config = Settings::new().expect("Failed to load test config");
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    web::Data::new(AppState::from_pool(config, Arc::new(pool)))
}

/// Unique per call so tests don't collide on the users.email constraint.
pub fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}
