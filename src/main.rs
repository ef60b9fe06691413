//! Bookmark Server - Library & Bookstore Management System
//!
//! A Rust REST API server for a combined lending library and book marketplace.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookmark_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookmark_server={},tower_http=debug", config.logging.level).into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Bookmark Server v{}", env!("CARGO_PKG_VERSION"));

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
    let config = Arc::new(config);
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.clone());

    // Bootstrap the initial admin account on an empty database
    services
        .users
        .ensure_admin("admin", "admin@bookmark.local", "admin123")
        .await
        .expect("Failed to bootstrap admin account");

    // Create application state
    let state = AppState {
        config,
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
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Public catalog
        .route("/catalog", get(api::catalog::landing))
        // Member area
        .route("/user/dashboard", get(api::user::dashboard))
        .route("/user/books", get(api::user::browse_books))
        .route("/user/books/:id", get(api::user::book_details))
        .route("/user/books/:id/reserve", post(api::user::reserve_book))
        .route("/user/books/:id/buy", post(api::user::buy_book))
        .route("/user/books/:id/reviews", post(api::user::create_review))
        .route("/user/sell", post(api::user::sell_book))
        .route("/user/listings", get(api::user::my_listings))
        // Librarian area
        .route("/librarian/dashboard", get(api::librarian::dashboard))
        .route("/librarian/books", get(api::librarian::list_books))
        .route("/librarian/books", post(api::librarian::create_book))
        .route("/librarian/books/:id", put(api::librarian::update_book))
        .route("/librarian/books/:id", delete(api::librarian::delete_book))
        .route("/librarian/reservations", get(api::librarian::list_reservations))
        .route("/librarian/reservations/:id/issue", post(api::librarian::issue_loan))
        .route("/librarian/reservations/:id/cancel", post(api::librarian::cancel_reservation))
        .route("/librarian/returns", post(api::librarian::lookup_returns))
        .route("/librarian/returns/:transaction_id/confirm", post(api::librarian::confirm_return))
        // Admin area
        .route("/admin/dashboard", get(api::admin::dashboard))
        .route("/admin/users", get(api::admin::list_users))
        .route("/admin/users/:id/promote", post(api::admin::promote_user))
        .route("/admin/sales", get(api::admin::sales_report))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
