//! Database access layer.
//!
//! Runtime-checked sqlx queries over PostgreSQL; schema lives under
//! `migrations/`.

pub mod models;
pub mod operations;

pub use models::{Book, User, UserProfile};
pub use operations::DbOperations;
