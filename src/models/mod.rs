//! Data models for Libra

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookStatus};
pub use loan::{LoanDetails, LoanRecord, LoanStatus};
pub use user::{AdminUser, StudentUser, User, UserRole};
