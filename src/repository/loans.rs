//! Loan ledger repository for database operations
//!
//! Guards and their mutations run atomically: Reserve wraps its checks and
//! insert in one transaction with the book row locked, and every lifecycle
//! transition is a conditional UPDATE keyed on the expected current status,
//! so a lost race surfaces as an InvalidTransition instead of corrupting
//! the ledger.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::book::BookStatus,
    models::loan::{DueTodayEntry, ListOrder, LoanDetails, LoanRecord, LoanRow, LoanStatus},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get ledger record by transaction ID
    pub async fn get_by_id(&self, transaction_id: i32) -> AppResult<LoanRecord> {
        let row = sqlx::query_as::<_, LoanRow>(
            "SELECT * FROM loan_records WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Transaction {} not found", transaction_id))
        })?;

        LoanRecord::try_from(row).map_err(AppError::Internal)
    }

    /// Create a PENDING reservation for (book, student).
    ///
    /// Guards, evaluated against the locked book row in one transaction:
    /// the book must be AVAILABLE, the student must not already hold an
    /// active record for it, and the student's active count must be below
    /// `max_active`.
    pub async fn reserve(
        &self,
        book_id: i32,
        school_id: &str,
        max_active: i64,
    ) -> AppResult<LoanRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book_status: Option<String> =
            sqlx::query_scalar("SELECT status FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let status = BookStatus::normalize(book_status.as_deref());
        if status != BookStatus::Available {
            return Err(AppError::InvalidTransition(format!(
                "Book {} is {}, only AVAILABLE books can be reserved",
                book_id, status
            )));
        }

        let already_reserved: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loan_records
                WHERE book_id = $1 AND school_id = $2
                  AND UPPER(status) IN ('PENDING', 'ACCEPTED', 'BORROWED')
            )
            "#,
        )
        .bind(book_id)
        .bind(school_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_reserved {
            return Err(AppError::InvalidTransition(format!(
                "Student {} already has an active reservation for book {}",
                school_id, book_id
            )));
        }

        let active_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM loan_records
            WHERE school_id = $1
              AND UPPER(status) IN ('PENDING', 'ACCEPTED', 'BORROWED')
            "#,
        )
        .bind(school_id)
        .fetch_one(&mut *tx)
        .await?;

        if active_count >= max_active {
            return Err(AppError::InvalidTransition(format!(
                "Reservation limit of {} active records reached",
                max_active
            )));
        }

        let transaction_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loan_records (book_id, school_id, status, date_borrowed)
            VALUES ($1, $2, $3, $4)
            RETURNING transaction_id
            "#,
        )
        .bind(book_id)
        .bind(school_id)
        .bind(LoanStatus::Pending.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(transaction_id).await
    }

    /// Move a record from `from` to `to` without side effects
    /// (Accept, Decline, Cancel).
    pub async fn transition(
        &self,
        transaction_id: i32,
        from: LoanStatus,
        to: LoanStatus,
    ) -> AppResult<LoanRecord> {
        let result = sqlx::query(
            "UPDATE loan_records SET status = $1 WHERE transaction_id = $2 AND UPPER(status) = $3",
        )
        .bind(to.as_str())
        .bind(transaction_id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.failed_transition(transaction_id, from, to).await);
        }

        self.get_by_id(transaction_id).await
    }

    /// ACCEPTED -> BORROWED: stamp the borrow date, compute the due date
    /// and flip the book to BORROWED, all in one transaction.
    pub async fn mark_borrowed(
        &self,
        transaction_id: i32,
        loan_period_days: i64,
    ) -> AppResult<LoanRecord> {
        let now = Utc::now();
        let due_date = now + Duration::days(loan_period_days);
        let mut tx = self.pool.begin().await?;

        let book_id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE loan_records
            SET status = $1, date_borrowed = $2, due_date = $3
            WHERE transaction_id = $4 AND UPPER(status) = $5
            RETURNING book_id
            "#,
        )
        .bind(LoanStatus::Borrowed.as_str())
        .bind(now)
        .bind(due_date)
        .bind(transaction_id)
        .bind(LoanStatus::Accepted.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let book_id = match book_id {
            Some(id) => id,
            None => {
                return Err(self
                    .failed_transition(transaction_id, LoanStatus::Accepted, LoanStatus::Borrowed)
                    .await)
            }
        };

        sqlx::query("UPDATE books SET status = $1 WHERE id = $2")
            .bind(BookStatus::Borrowed.as_str())
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(transaction_id).await
    }

    /// BORROWED -> RETURNED: stamp the return date and send the book to
    /// PENDING SHELVING (never straight back to AVAILABLE).
    pub async fn mark_returned(&self, transaction_id: i32) -> AppResult<LoanRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book_id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE loan_records
            SET status = $1, date_returned = $2
            WHERE transaction_id = $3 AND UPPER(status) = $4
            RETURNING book_id
            "#,
        )
        .bind(LoanStatus::Returned.as_str())
        .bind(now)
        .bind(transaction_id)
        .bind(LoanStatus::Borrowed.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let book_id = match book_id {
            Some(id) => id,
            None => {
                return Err(self
                    .failed_transition(transaction_id, LoanStatus::Borrowed, LoanStatus::Returned)
                    .await)
            }
        };

        sqlx::query("UPDATE books SET status = $1 WHERE id = $2")
            .bind(BookStatus::PendingShelving.as_str())
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(transaction_id).await
    }

    /// Active reservation board: PENDING, ACCEPTED and BORROWED records,
    /// ordered by status rank then request date in the given direction,
    /// optionally scoped to one student.
    pub async fn list_active(
        &self,
        school_id: Option<&str>,
        order: ListOrder,
    ) -> AppResult<Vec<LoanDetails>> {
        let direction = match order {
            ListOrder::OldestFirst => "ASC",
            ListOrder::NewestFirst => "DESC",
        };

        let scope = if school_id.is_some() {
            " AND lr.school_id = $1"
        } else {
            ""
        };

        let query = format!(
            r#"
            SELECT lr.transaction_id, lr.book_id, b.title,
                   lr.school_id, su.name AS borrower_name, su.grade_section,
                   su.contact_no, su.email,
                   lr.status, lr.date_borrowed, lr.due_date, lr.date_returned
            FROM loan_records lr
            LEFT JOIN books b ON lr.book_id = b.id
            LEFT JOIN student_users su ON lr.school_id = su.school_id
            WHERE UPPER(lr.status) IN ('PENDING', 'ACCEPTED', 'BORROWED'){}
            ORDER BY
                CASE
                    WHEN UPPER(lr.status) = 'PENDING' THEN 1
                    WHEN UPPER(lr.status) = 'ACCEPTED' THEN 2
                    WHEN UPPER(lr.status) = 'BORROWED' THEN 3
                    ELSE 4
                END,
                lr.date_borrowed {}
            "#,
            scope, direction
        );

        let mut builder = sqlx::query(&query);
        if let Some(id) = school_id {
            builder = builder.bind(id);
        }
        let rows = builder.fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_details).collect()
    }

    /// Completed transactions: DECLINED, CANCELLED and RETURNED records,
    /// newest effective date first, optionally scoped to one student.
    pub async fn list_history(&self, school_id: Option<&str>) -> AppResult<Vec<LoanDetails>> {
        let scope = if school_id.is_some() {
            " AND lr.school_id = $1"
        } else {
            ""
        };

        let query = format!(
            r#"
            SELECT lr.transaction_id, lr.book_id, b.title,
                   lr.school_id, su.name AS borrower_name, su.grade_section,
                   su.contact_no, su.email,
                   lr.status, lr.date_borrowed, lr.due_date, lr.date_returned
            FROM loan_records lr
            LEFT JOIN books b ON lr.book_id = b.id
            LEFT JOIN student_users su ON lr.school_id = su.school_id
            WHERE UPPER(lr.status) IN ('DECLINED', 'CANCELLED', 'RETURNED'){}
            ORDER BY COALESCE(lr.date_returned, lr.date_borrowed) DESC
            "#,
            scope
        );

        let mut builder = sqlx::query(&query);
        if let Some(id) = school_id {
            builder = builder.bind(id);
        }
        let rows = builder.fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::row_to_details).collect()
    }

    /// Count active ledger records, optionally for one student
    pub async fn count_active(&self, school_id: Option<&str>) -> AppResult<i64> {
        let count: i64 = if let Some(id) = school_id {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM loan_records
                WHERE school_id = $1 AND UPPER(status) IN ('PENDING', 'ACCEPTED', 'BORROWED')
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM loan_records WHERE UPPER(status) IN ('PENDING', 'ACCEPTED', 'BORROWED')",
            )
            .fetch_one(&self.pool)
            .await?
        };
        Ok(count)
    }

    /// Loans due on the current date, with borrower contact details
    pub async fn due_today(&self) -> AppResult<Vec<DueTodayEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT lr.book_id, b.title, su.name AS borrower_name,
                   su.contact_no, lr.due_date
            FROM loan_records lr
            LEFT JOIN books b ON lr.book_id = b.id
            LEFT JOIN student_users su ON lr.school_id = su.school_id
            WHERE UPPER(lr.status) = 'BORROWED'
              AND lr.due_date::date = CURRENT_DATE
            ORDER BY lr.due_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DueTodayEntry {
                book_id: row.get("book_id"),
                title: row.get("title"),
                borrower_name: row.get("borrower_name"),
                contact_no: row.get("contact_no"),
                due_date: row.get("due_date"),
            })
            .collect())
    }

    /// Build the error for a conditional update that matched no row:
    /// either the record is gone or it was not in the expected status.
    async fn failed_transition(
        &self,
        transaction_id: i32,
        from: LoanStatus,
        to: LoanStatus,
    ) -> AppError {
        match self.get_by_id(transaction_id).await {
            Ok(record) => AppError::InvalidTransition(format!(
                "Transaction {} is {}, expected {} for transition to {}",
                transaction_id, record.status, from, to
            )),
            Err(e) => e,
        }
    }

    fn row_to_details(row: sqlx::postgres::PgRow) -> AppResult<LoanDetails> {
        let status: LoanStatus = row
            .get::<String, _>("status")
            .parse()
            .map_err(AppError::Internal)?;
        let due_date: Option<DateTime<Utc>> = row.get("due_date");
        let is_overdue = status == LoanStatus::Borrowed
            && due_date.map(|d| d < Utc::now()).unwrap_or(false);

        Ok(LoanDetails {
            transaction_id: row.get("transaction_id"),
            book_id: row.get("book_id"),
            title: row.get("title"),
            school_id: row.get("school_id"),
            borrower_name: row.get("borrower_name"),
            grade_section: row.get("grade_section"),
            contact_no: row.get("contact_no"),
            email: row.get("email"),
            status,
            date_borrowed: row.get("date_borrowed"),
            due_date,
            date_returned: row.get("date_returned"),
            is_overdue,
        })
    }
}
