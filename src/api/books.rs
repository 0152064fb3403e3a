//! Book catalog endpoints
//!
//! Reads are open to any authenticated account; writes require a
//! librarian. Shelving status is writable only through the catalog update
//! endpoint, which is how a book in PENDING SHELVING goes back to
//! AVAILABLE once it is physically reshelved.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
};

use super::AuthenticatedUser;

/// List the full catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Catalog snapshot", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;

    let book = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book's fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let book = state.services.catalog.update_book(id, book).await?;
    Ok(Json(book))
}

/// Remove a book from the catalog
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
