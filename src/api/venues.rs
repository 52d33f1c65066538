//! Venue routes

use super::{AppState, caller::Caller, error::ApiResult, params};
use crate::core::venue::{self, NewVenue, VenueDetail, VenueListPage};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// GET /venues
/// Filtered, sorted, paginated listing. Anonymous callers get no favourite or
/// `booked_by_me` flags.
pub async fn list_venues(
    State(state): State<AppState>,
    caller: Option<Caller>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<VenueListPage>> {
    let list_params = params::venue_list_params(&pairs, caller.map(Caller::user_id))?;
    let page = venue::list_venues(&state.db, &list_params).await?;
    Ok(Json(page))
}

/// GET /venues/:id
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<VenueDetail>> {
    let detail = venue::get_venue_detail(&state.db, id).await?;
    Ok(Json(detail))
}

/// POST /venues
/// Creates a venue hosted by the caller
pub async fn create_venue(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<NewVenue>,
) -> ApiResult<(StatusCode, Json<VenueDetail>)> {
    let created = venue::create_venue_for_host(&state.db, caller.user_id(), req).await?;
    let detail = venue::get_venue_detail(&state.db, created.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}
