//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libra API",
        version = "1.0.0",
        description = "School Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::update_profile,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Users
        users::list_admins,
        users::get_admin,
        users::create_admin,
        users::update_admin,
        users::delete_admin,
        users::list_students,
        users::get_student,
        users::create_student,
        users::update_student,
        users::delete_student,
        // Loans
        loans::reserve,
        loans::get_loan,
        loans::accept,
        loans::decline,
        loans::cancel,
        loans::mark_borrowed,
        loans::mark_returned,
        loans::list_active,
        loans::list_history,
        loans::list_mine,
        loans::list_mine_history,
        loans::due_today,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Users
            crate::models::user::User,
            crate::models::user::UserRole,
            crate::models::user::AdminUser,
            crate::models::user::StudentUser,
            crate::models::user::CreateAdmin,
            crate::models::user::CreateStudent,
            crate::models::user::UpdateUser,
            // Loans
            loans::ReserveRequest,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanRecord,
            crate::models::loan::LoanDetails,
            crate::models::loan::DueTodayEntry,
            // Stats
            stats::DashboardStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "users", description = "User directory management"),
        (name = "loans", description = "Loan ledger operations"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
