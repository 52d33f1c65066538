//! Favourite routes

use super::{AppState, caller::Caller, error::ApiResult};
use crate::core::favourite::{self, FavouriteVenue};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

/// GET /favourites/me
pub async fn list_favourites(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<FavouriteVenue>>> {
    let favourites = favourite::list_favourites(&state.db, caller.user_id()).await?;
    Ok(Json(favourites))
}

/// GET /favourites/me/ids
pub async fn list_favourite_ids(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<i64>>> {
    let ids = favourite::list_favourite_venue_ids(&state.db, caller.user_id()).await?;
    Ok(Json(ids))
}

/// POST /favourites/:venueId
/// 201 when newly added, 200 when it already was a favourite
pub async fn add_favourite(
    State(state): State<AppState>,
    caller: Caller,
    Path(venue_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let added = favourite::add_favourite(&state.db, caller.user_id(), venue_id).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "venueId": venue_id, "isFavourite": true }))))
}

/// DELETE /favourites/:venueId
pub async fn remove_favourite(
    State(state): State<AppState>,
    caller: Caller,
    Path(venue_id): Path<i64>,
) -> ApiResult<StatusCode> {
    favourite::remove_favourite(&state.db, caller.user_id(), venue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
