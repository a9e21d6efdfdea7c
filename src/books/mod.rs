//! Ownership-scoped book CRUD. Every route sits behind the access-token
//! guard; queries filter by the authenticated user's id.

pub mod handlers;
