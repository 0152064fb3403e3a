//! Libra Server - School Library Management System
//!
//! REST API server for the school library: catalog, user directory and
//! loan ledger.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libra_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libra_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libra Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.loans.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        // Admins
        .route("/admins", get(api::users::list_admins))
        .route("/admins", post(api::users::create_admin))
        .route("/admins/:school_id", get(api::users::get_admin))
        .route("/admins/:school_id", put(api::users::update_admin))
        .route("/admins/:school_id", delete(api::users::delete_admin))
        // Students
        .route("/students", get(api::users::list_students))
        .route("/students", post(api::users::create_student))
        .route("/students/:school_id", get(api::users::get_student))
        .route("/students/:school_id", put(api::users::update_student))
        .route("/students/:school_id", delete(api::users::delete_student))
        // Loan ledger
        .route("/loans/reserve", post(api::loans::reserve))
        .route("/loans/active", get(api::loans::list_active))
        .route("/loans/history", get(api::loans::list_history))
        .route("/loans/mine", get(api::loans::list_mine))
        .route("/loans/mine/history", get(api::loans::list_mine_history))
        .route("/loans/due-today", get(api::loans::due_today))
        .route("/loans/:id", get(api::loans::get_loan))
        .route("/loans/:id/accept", post(api::loans::accept))
        .route("/loans/:id/decline", post(api::loans::decline))
        .route("/loans/:id/cancel", post(api::loans::cancel))
        .route("/loans/:id/borrow", post(api::loans::mark_borrowed))
        .route("/loans/:id/return", post(api::loans::mark_returned))
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
