//! Loan ledger model and lifecycle state machine
//!
//! Every reservation or loan attempt is one ledger row linking a book and a
//! student. The row moves through a fixed partial order of statuses:
//!
//! ```text
//!            Accept            MarkBorrowed        MarkReturned
//! PENDING ----------> ACCEPTED ----------> BORROWED ----------> RETURNED
//!    |  \
//!    |   `--Decline--> DECLINED
//!    `------Cancel---> CANCELLED
//! ```
//!
//! DECLINED, CANCELLED and RETURNED are terminal. A record whose status is
//! PENDING, ACCEPTED or BORROWED is "active" and counts against the
//! per-student reservation quota.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lifecycle status of a ledger record.
/// Stored as free text in the database and compared case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Borrowed,
    Returned,
}

impl LoanStatus {
    /// Statuses that count against the per-student quota and block
    /// duplicate reservations of the same book.
    pub const ACTIVE: [LoanStatus; 3] =
        [LoanStatus::Pending, LoanStatus::Accepted, LoanStatus::Borrowed];

    /// Canonical database representation (upper case)
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::Accepted => "ACCEPTED",
            LoanStatus::Declined => "DECLINED",
            LoanStatus::Cancelled => "CANCELLED",
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Declined | LoanStatus::Cancelled | LoanStatus::Returned)
    }

    /// Display rank used to order the active reservation board:
    /// pending requests first, then accepted, then books out on loan.
    pub fn rank(&self) -> i16 {
        match self {
            LoanStatus::Pending => 1,
            LoanStatus::Accepted => 2,
            LoanStatus::Borrowed => 3,
            _ => 4,
        }
    }

    /// Whether `next` is a legal successor of `self` in the lifecycle.
    /// Guards beyond the status itself (ownership, book availability,
    /// quota) are enforced by the ledger service.
    pub fn allows(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Pending, LoanStatus::Accepted)
                | (LoanStatus::Pending, LoanStatus::Declined)
                | (LoanStatus::Pending, LoanStatus::Cancelled)
                | (LoanStatus::Accepted, LoanStatus::Borrowed)
                | (LoanStatus::Borrowed, LoanStatus::Returned)
        )
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(LoanStatus::Pending),
            "ACCEPTED" => Ok(LoanStatus::Accepted),
            "DECLINED" => Ok(LoanStatus::Declined),
            "CANCELLED" => Ok(LoanStatus::Cancelled),
            "BORROWED" => Ok(LoanStatus::Borrowed),
            "RETURNED" => Ok(LoanStatus::Returned),
            other => Err(format!("Unknown loan status: {}", other)),
        }
    }
}

/// Sort direction for the active reservation board. The administrator
/// board shows oldest requests first; the student view shows newest
/// first. Both orderings are intentional and preserved per consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    OldestFirst,
    NewestFirst,
}

/// Internal row structure for ledger queries (status as raw text)
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    transaction_id: i32,
    book_id: i32,
    school_id: String,
    status: String,
    date_borrowed: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    date_returned: Option<DateTime<Utc>>,
}

impl TryFrom<LoanRow> for LoanRecord {
    type Error = String;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        Ok(LoanRecord {
            transaction_id: row.transaction_id,
            book_id: row.book_id,
            school_id: row.school_id,
            status: row.status.parse()?,
            date_borrowed: row.date_borrowed,
            due_date: row.due_date,
            date_returned: row.date_returned,
        })
    }
}

/// Persisted ledger record. The ledger exclusively owns these rows;
/// `book_id` and `school_id` are back-references whose targets may be
/// deleted without affecting the record's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanRecord {
    pub transaction_id: i32,
    pub book_id: i32,
    pub school_id: String,
    pub status: LoanStatus,
    /// Set at reservation time (requested-at), reset when the loan starts
    pub date_borrowed: Option<DateTime<Utc>>,
    /// Set only when the record passes through BORROWED
    pub due_date: Option<DateTime<Utc>>,
    /// Set only on RETURNED
    pub date_returned: Option<DateTime<Utc>>,
}

/// Ledger record with display fields joined in at read time.
/// Title and borrower details are projections, not authoritative state;
/// they are null when the referenced book or student no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub transaction_id: i32,
    pub book_id: i32,
    pub title: Option<String>,
    pub school_id: String,
    pub borrower_name: Option<String>,
    pub grade_section: Option<String>,
    pub contact_no: Option<String>,
    pub email: Option<String>,
    pub status: LoanStatus,
    pub date_borrowed: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub date_returned: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

/// Entry on the dashboard's due-today board
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DueTodayEntry {
    pub book_id: i32,
    pub title: Option<String>,
    pub borrower_name: Option<String>,
    pub contact_no: Option<String>,
    pub due_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LoanStatus; 6] = [
        LoanStatus::Pending,
        LoanStatus::Accepted,
        LoanStatus::Declined,
        LoanStatus::Cancelled,
        LoanStatus::Borrowed,
        LoanStatus::Returned,
    ];

    #[test]
    fn lifecycle_edges_are_exactly_the_five_listed() {
        let legal = [
            (LoanStatus::Pending, LoanStatus::Accepted),
            (LoanStatus::Pending, LoanStatus::Declined),
            (LoanStatus::Pending, LoanStatus::Cancelled),
            (LoanStatus::Accepted, LoanStatus::Borrowed),
            (LoanStatus::Borrowed, LoanStatus::Returned),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.allows(to),
                    legal.contains(&(from, to)),
                    "{} -> {} disagreement",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for from in [LoanStatus::Declined, LoanStatus::Cancelled, LoanStatus::Returned] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.allows(to), "{} should be terminal", from);
            }
        }
    }

    #[test]
    fn accept_on_borrowed_record_is_rejected() {
        assert!(!LoanStatus::Borrowed.allows(LoanStatus::Accepted));
    }

    #[test]
    fn active_set_matches_quota_semantics() {
        for status in ALL {
            assert_eq!(
                status.is_active(),
                matches!(status, LoanStatus::Pending | LoanStatus::Accepted | LoanStatus::Borrowed)
            );
            assert_ne!(status.is_active(), status.is_terminal());
        }
    }

    #[test]
    fn board_ranks_pending_before_accepted_before_borrowed() {
        assert!(LoanStatus::Pending.rank() < LoanStatus::Accepted.rank());
        assert!(LoanStatus::Accepted.rank() < LoanStatus::Borrowed.rank());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("pending".parse::<LoanStatus>().unwrap(), LoanStatus::Pending);
        assert_eq!(" Returned ".parse::<LoanStatus>().unwrap(), LoanStatus::Returned);
        assert!("renewed".parse::<LoanStatus>().is_err());
    }
}
