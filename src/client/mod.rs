//! Rust API client mirroring the original SPA's session handling: an
//! in-memory session store and a request layer that transparently refreshes
//! an expired access token at most once per call.

pub mod http;
pub mod session;

use serde::{Deserialize, Serialize};

pub use http::{ApiClient, ClientError};
pub use session::{ClientSession, SessionStore};

#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A book as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BookRecord {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub isbn: String,
    pub title: String,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub source: Option<String>,
}
