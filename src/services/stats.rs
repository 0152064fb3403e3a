//! Dashboard statistics service

use crate::{
    api::stats::DashboardStats,
    error::AppResult,
    models::book::BookStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Round trip to the database, used by the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }

    /// Snapshot of the library for the librarian dashboard: catalog
    /// counts per shelving status, directory size, active ledger volume
    /// and the loans falling due today.
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let total_books = self.repository.books.count_total().await?;
        let available_books = self
            .repository
            .books
            .count_by_status(BookStatus::Available)
            .await?;
        let borrowed_books = self
            .repository
            .books
            .count_by_status(BookStatus::Borrowed)
            .await?;
        let pending_shelving = self
            .repository
            .books
            .count_by_status(BookStatus::PendingShelving)
            .await?;
        let total_students = self.repository.users.count_students().await?;
        let active_records = self.repository.loans.count_active(None).await?;
        let due_today = self.repository.loans.due_today().await?;

        Ok(DashboardStats {
            total_books,
            available_books,
            borrowed_books,
            pending_shelving,
            total_students,
            active_records,
            due_today,
        })
    }
}
