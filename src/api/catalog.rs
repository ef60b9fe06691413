//! Public catalog endpoints, no authentication required

use axum::{extract::State, Json};

use crate::{error::AppResult, models::book::LandingResponse, AppState};

/// Public landing page: new releases, top rated, recommendations and categories
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Landing page collections", body = LandingResponse)
    )
)]
pub async fn landing(State(state): State<AppState>) -> AppResult<Json<LandingResponse>> {
    let response = state.services.catalog.landing().await?;
    Ok(Json(response))
}
