//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookRow, BookStatus, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Full catalog snapshot, ordered by title
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    /// Create a new book. New entries always start out AVAILABLE.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (
                author, title, edition, volumes, pages,
                publisher, year, category, shelf_location, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&book.author)
        .bind(&book.title)
        .bind(&book.edition)
        .bind(book.volumes)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(&book.category)
        .bind(book.shelf_location)
        .bind(BookStatus::Available.as_str())
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Full replace of a book by ID
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET author = $1, title = $2, edition = $3, volumes = $4, pages = $5,
                publisher = $6, year = $7, category = $8, shelf_location = $9, status = $10
            WHERE id = $11
            "#,
        )
        .bind(&book.author)
        .bind(&book.title)
        .bind(&book.edition)
        .bind(book.volumes)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(&book.category)
        .bind(book.shelf_location)
        .bind(book.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book. Idempotent: deleting an absent id is not an error.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Count books in a given shelving status, bucketing rows the same
    /// way reads normalize them: blank and unrecognized cells count as
    /// AVAILABLE, and the accepted PENDING SHELVING spellings all count
    /// as that status. The three counts partition the catalog.
    pub async fn count_by_status(&self, status: BookStatus) -> AppResult<i64> {
        let query = match status {
            BookStatus::Available => {
                "SELECT COUNT(*) FROM books WHERE UPPER(TRIM(COALESCE(status, ''))) \
                 NOT IN ('BORROWED', 'PENDING', 'PENDING SHELVING', 'PENDING_SHELVING')"
            }
            BookStatus::Borrowed => {
                "SELECT COUNT(*) FROM books WHERE UPPER(TRIM(COALESCE(status, ''))) = 'BORROWED'"
            }
            BookStatus::PendingShelving => {
                "SELECT COUNT(*) FROM books WHERE UPPER(TRIM(COALESCE(status, ''))) \
                 IN ('PENDING', 'PENDING SHELVING', 'PENDING_SHELVING')"
            }
        };

        let count: i64 = sqlx::query_scalar(query).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Count all books
    pub async fn count_total(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
