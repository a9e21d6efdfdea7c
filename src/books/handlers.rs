use crate::auth::guard::AuthenticatedUser;
use crate::db::models::Book;
use crate::error::AppError;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    /// "scan" or "manual"
    pub source: Option<String>,
}

pub async fn create_book(
    auth: AuthenticatedUser,
    req: web::Json<CreateBookRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();

    if req.isbn.is_empty() || req.title.is_empty() {
        return Err(AppError::Validation("isbn and title are required".into()));
    }

    let book = Book::new(
        auth.user_id,
        req.isbn,
        req.title,
        req.author,
        req.cover_url,
        req.source,
    );

    // (user_id, isbn) is unique; a duplicate save surfaces as Conflict.
    let created = state.db.create_book(&book).await?;
    info!("Book {} saved for user {}", created.id, auth.user_id);

    Ok(HttpResponse::Created().json(created))
}

pub async fn list_books(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let books = state.db.list_books(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(books))
}

/// 404 whether the book is absent or owned by another user.
pub async fn get_book(
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let book = state
        .db
        .get_book(auth.user_id, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(book))
}

pub async fn delete_book(
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let deleted = state.db.delete_book(auth.user_id, path.into_inner()).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(HttpResponse::NoContent().finish())
}
