pub mod auth;
pub mod books;
pub mod client;
pub mod config;
pub mod db;
pub mod error;

use actix_web::HttpResponse;
use sqlx::PgPool;
use std::sync::Arc;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::{AuthenticatedUser, SessionService, TokenIssuer};
pub use db::{Book, DbOperations, User, UserProfile};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: Arc<PgPool>,
    pub db: Arc<DbOperations>,
    pub session: Arc<SessionService>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let db_pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Self::from_pool(config, Arc::new(db_pool)))
    }

    /// Wires the session service and repositories around an existing pool.
    pub fn from_pool(config: Settings, db_pool: Arc<PgPool>) -> Self {
        let db = Arc::new(DbOperations::new(db_pool.clone()));
        let session = Arc::new(SessionService::new(
            DbOperations::new(db_pool.clone()),
            TokenIssuer::new(&config.auth),
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            db,
            session,
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.db_pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use actix_web::web;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    /// App state over a lazy pool: valid for any code path that fails
    /// before touching the database.
    pub fn test_state() -> web::Data<AppState> {
        let config = Settings::new_for_test().expect("test config");
        let pool = Arc::new(PgPool::connect_lazy(&config.database.url).expect("lazy pool"));
        web::Data::new(AppState::from_pool(config, pool))
    }

    pub fn bearer(state: &AppState, user_id: Uuid) -> String {
        let token = state.session.tokens().issue_access(user_id).expect("token");
        format!("Bearer {}", token)
    }

    /// A structurally valid access token whose expiry is in the past.
    pub fn expired_bearer(state: &AppState, user_id: Uuid) -> String {
        let now = Utc::now();
        let claims = auth::Claims {
            sub: user_id.to_string(),
            iat: (now - Duration::minutes(31)).timestamp(),
            exp: (now - Duration::minutes(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(state.config.auth.access_secret.as_bytes()),
        )
        .expect("token");
        format!("Bearer {}", token)
    }
}
