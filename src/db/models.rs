use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    /// The single live refresh token for this user, if any. Overwritten on
    /// each login, cleared on logout or a failed refresh.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            first_name,
            last_name,
            password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public view of the user, safe to return from the API.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// What `GET /api/auth/user` returns. Never includes the password hash or
/// the stored refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub user_id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    /// "scan" or "manual"
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(
        user_id: Uuid,
        isbn: String,
        title: String,
        author: Option<String>,
        cover_url: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            isbn,
            title,
            author,
            cover_url,
            source,
            created_at: Utc::now(),
        }
    }
}
