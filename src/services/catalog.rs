//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a book by id
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Full catalog snapshot
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.create(&book).await
    }

    /// Replace a book's descriptive fields and shelving status
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.update(id, &book).await
    }

    /// Remove a book from the catalog. Ledger records that reference it
    /// keep their book id as a dangling back-reference.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
