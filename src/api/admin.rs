//! Administrator endpoints: user management and reporting

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{User, UserQuery},
    services::reports::{AdminDashboard, SalesReport},
    AppState,
};

use super::AuthenticatedUser;

/// Paged user listing
#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: i64,
}

/// System-wide counters and recent activity
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboard),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AdminDashboard>> {
    claims.require_admin()?;

    let dashboard = state.services.reports.admin_dashboard().await?;
    Ok(Json(dashboard))
}

/// List user accounts
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "User accounts", body = UserListResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<UserListResponse>> {
    claims.require_admin()?;

    let (users, total) = state.services.users.list(query.page, query.per_page).await?;
    Ok(Json(UserListResponse { users, total }))
}

/// Toggle a user between the user and librarian roles
#[utoipa::path(
    post,
    path = "/admin/users/{id}/promote",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Role toggled", body = User),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Admin accounts cannot be toggled")
    )
)]
pub async fn promote_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.users.promote(id).await?;
    Ok(Json(user))
}

/// Sales report: all completed purchases and revenue total
#[utoipa::path(
    get,
    path = "/admin/sales",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sales report", body = SalesReport),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn sales_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SalesReport>> {
    claims.require_admin()?;

    let report = state.services.reports.sales_report().await?;
    Ok(Json(report))
}
