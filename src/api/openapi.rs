//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, catalog, health, librarian, user};

/// Registers the bearer token scheme referenced by the protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookmark API",
        version = "1.0.0",
        description = "Library and bookstore management REST API",
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
        auth::register,
        auth::login,
        auth::me,
        // Public catalog
        catalog::landing,
        // Member
        user::dashboard,
        user::browse_books,
        user::book_details,
        user::reserve_book,
        user::buy_book,
        user::create_review,
        user::sell_book,
        user::my_listings,
        // Librarian
        librarian::dashboard,
        librarian::list_books,
        librarian::create_book,
        librarian::update_book,
        librarian::delete_book,
        librarian::list_reservations,
        librarian::issue_loan,
        librarian::cancel_reservation,
        librarian::lookup_returns,
        librarian::confirm_return,
        // Admin
        admin::dashboard,
        admin::list_users,
        admin::promote_user,
        admin::sales_report,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::UserQuery,
            admin::UserListResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::CreateListing,
            crate::models::book::BookQuery,
            crate::models::book::CategoryShelf,
            crate::models::book::BrowseResponse,
            crate::models::book::LandingResponse,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionDetails,
            crate::models::transaction::TransactionStatus,
            crate::models::transaction::TransactionType,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::ReservationStatus,
            // Reviews
            crate::models::review::Review,
            crate::models::review::ReviewDetails,
            crate::models::review::CreateReview,
            // Dashboards & reports
            crate::services::catalog::BookDetails,
            crate::services::loans::UserDashboard,
            crate::services::loans::LibrarianDashboard,
            crate::services::reports::AdminDashboard,
            crate::services::reports::SalesReport,
            // Misc
            librarian::ReturnsLookupRequest,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Public catalog"),
        (name = "user", description = "Member endpoints"),
        (name = "librarian", description = "Catalog and circulation management"),
        (name = "admin", description = "User management and reporting")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
