//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Shelving status of a catalog book.
/// Stored as free text in the database and compared case-insensitively;
/// unrecognized or blank values normalize to `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    Available,
    Borrowed,
    PendingShelving,
}

impl BookStatus {
    /// Canonical database representation (upper case, legacy spelling)
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::Borrowed => "BORROWED",
            BookStatus::PendingShelving => "PENDING SHELVING",
        }
    }

    /// Normalize a raw status cell into one of the three known values.
    /// Blank and unrecognized cells default to `Available`, matching how
    /// catalog rows without a status have always been treated.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            None => BookStatus::Available,
            Some(s) => s.parse().unwrap_or(BookStatus::Available),
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "" | "AVAILABLE" => Ok(BookStatus::Available),
            "BORROWED" => Ok(BookStatus::Borrowed),
            "PENDING" | "PENDING SHELVING" | "PENDING_SHELVING" => Ok(BookStatus::PendingShelving),
            other => Err(format!("Unknown book status: {}", other)),
        }
    }
}

/// Internal row structure for database queries (status as raw text)
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    id: i32,
    author: Option<String>,
    title: Option<String>,
    edition: Option<String>,
    volumes: Option<i32>,
    pages: Option<i32>,
    publisher: Option<String>,
    year: Option<i32>,
    category: Option<String>,
    shelf_location: i32,
    status: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            author: row.author,
            title: row.title,
            edition: row.edition,
            volumes: row.volumes,
            pages: row.pages,
            publisher: row.publisher,
            year: row.year,
            category: row.category,
            shelf_location: row.shelf_location,
            status: BookStatus::normalize(row.status.as_deref()),
        }
    }
}

/// Catalog book model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub author: Option<String>,
    pub title: Option<String>,
    pub edition: Option<String>,
    pub volumes: Option<i32>,
    pub pages: Option<i32>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    /// Physical placement code of the copy
    pub shelf_location: i32,
    pub status: BookStatus,
}

/// Create book request. Status is not accepted from the client:
/// new catalog entries always start out AVAILABLE.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub edition: Option<String>,
    pub volumes: Option<i32>,
    pub pages: Option<i32>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub shelf_location: i32,
}

/// Update book request (full replace of descriptive fields by id)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub edition: Option<String>,
    pub volumes: Option<i32>,
    pub pages: Option<i32>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub shelf_location: i32,
    pub status: BookStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("available".parse::<BookStatus>().unwrap(), BookStatus::Available);
        assert_eq!("BORROWED".parse::<BookStatus>().unwrap(), BookStatus::Borrowed);
        assert_eq!("Pending Shelving".parse::<BookStatus>().unwrap(), BookStatus::PendingShelving);
        assert_eq!("  pending  ".parse::<BookStatus>().unwrap(), BookStatus::PendingShelving);
    }

    #[test]
    fn blank_and_unknown_normalize_to_available() {
        assert_eq!(BookStatus::normalize(None), BookStatus::Available);
        assert_eq!(BookStatus::normalize(Some("")), BookStatus::Available);
        assert_eq!(BookStatus::normalize(Some("misfiled")), BookStatus::Available);
    }

    #[test]
    fn canonical_form_round_trips() {
        for status in [BookStatus::Available, BookStatus::Borrowed, BookStatus::PendingShelving] {
            assert_eq!(status.as_str().parse::<BookStatus>().unwrap(), status);
        }
    }
}
