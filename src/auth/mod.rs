//! Session and credential management.
//!
//! Paired short-lived access / long-lived refresh JWTs, signed with
//! independent secrets. The refresh token is persisted on the user record
//! (one live session per user) and travels in an http-only cookie; the
//! access token lives only in response bodies and Authorization headers.

pub mod guard;
pub mod handlers;
pub mod service;
pub mod tokens;

pub use guard::AuthenticatedUser;
pub use service::{RegisterData, SessionService, TokenPair};
pub use tokens::{Claims, TokenIssuer};
