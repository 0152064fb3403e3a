//! Loan ledger service
//!
//! Drives the reservation lifecycle. Status-machine legality is enforced
//! by the repository's conditional updates; this layer adds the guards
//! that depend on who is asking, such as cancellation ownership.

use crate::{
    config::LoanConfig,
    error::{AppError, AppResult},
    models::loan::{DueTodayEntry, ListOrder, LoanDetails, LoanRecord, LoanStatus},
    models::user::UserClaims,
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    config: LoanConfig,
}

impl LedgerService {
    pub fn new(repository: Repository, config: LoanConfig) -> Self {
        Self { repository, config }
    }

    /// Reserve a book for a student. The reservation enters the ledger as
    /// PENDING and waits for a librarian decision.
    pub async fn reserve(&self, school_id: &str, book_id: i32) -> AppResult<LoanRecord> {
        // The student must still exist; tokens can outlive accounts.
        self.repository.users.get_student(school_id).await?;

        let record = self
            .repository
            .loans
            .reserve(book_id, school_id, self.config.max_active_reservations)
            .await?;

        tracing::info!(
            transaction_id = record.transaction_id,
            book_id,
            school_id = %school_id,
            "reservation created"
        );
        Ok(record)
    }

    /// Librarian approves a pending reservation
    pub async fn accept(&self, transaction_id: i32) -> AppResult<LoanRecord> {
        self.repository
            .loans
            .transition(transaction_id, LoanStatus::Pending, LoanStatus::Accepted)
            .await
    }

    /// Librarian rejects a pending reservation
    pub async fn decline(&self, transaction_id: i32) -> AppResult<LoanRecord> {
        self.repository
            .loans
            .transition(transaction_id, LoanStatus::Pending, LoanStatus::Declined)
            .await
    }

    /// Withdraw a pending reservation. Only the owning student may
    /// cancel; a librarian refusal is a Decline, not a Cancel.
    pub async fn cancel(&self, transaction_id: i32, claims: &UserClaims) -> AppResult<LoanRecord> {
        claims.require_student()?;

        let record = self.repository.loans.get_by_id(transaction_id).await?;
        if record.school_id != claims.sub {
            return Err(AppError::Authorization(
                "Reservations can only be cancelled by their owner".to_string(),
            ));
        }

        self.repository
            .loans
            .transition(transaction_id, LoanStatus::Pending, LoanStatus::Cancelled)
            .await
    }

    /// Hand the book over: the accepted reservation becomes a live loan
    /// with a due date, and the book leaves the shelf.
    pub async fn mark_borrowed(&self, transaction_id: i32) -> AppResult<LoanRecord> {
        let record = self
            .repository
            .loans
            .mark_borrowed(transaction_id, self.config.loan_period_days)
            .await?;

        tracing::info!(
            transaction_id,
            book_id = record.book_id,
            due_date = ?record.due_date,
            "loan started"
        );
        Ok(record)
    }

    /// Take the book back: the loan closes and the book goes to the
    /// shelving queue, not directly back into circulation.
    pub async fn mark_returned(&self, transaction_id: i32) -> AppResult<LoanRecord> {
        let record = self.repository.loans.mark_returned(transaction_id).await?;

        tracing::info!(transaction_id, book_id = record.book_id, "loan closed");
        Ok(record)
    }

    /// Get one ledger record. Students only see their own records.
    pub async fn get(&self, transaction_id: i32, claims: &UserClaims) -> AppResult<LoanRecord> {
        let record = self.repository.loans.get_by_id(transaction_id).await?;
        if !claims.is_admin() && record.school_id != claims.sub {
            return Err(AppError::NotFound(format!(
                "Transaction {} not found",
                transaction_id
            )));
        }
        Ok(record)
    }

    /// Librarian's reservation board: every active record, oldest
    /// requests first within each status.
    pub async fn list_active_board(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository
            .loans
            .list_active(None, ListOrder::OldestFirst)
            .await
    }

    /// A student's own active records, newest first within each status
    pub async fn list_student_active(&self, school_id: &str) -> AppResult<Vec<LoanDetails>> {
        self.repository
            .loans
            .list_active(Some(school_id), ListOrder::NewestFirst)
            .await
    }

    /// Completed transactions, optionally scoped to one student
    pub async fn list_history(&self, school_id: Option<&str>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_history(school_id).await
    }

    /// Live loans due on the current date
    pub async fn due_today(&self) -> AppResult<Vec<DueTodayEntry>> {
        self.repository.loans.due_today().await
    }
}
