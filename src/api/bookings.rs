//! Booking routes

use super::{AppState, caller::Caller, error::ApiResult, params::parse_date};
use crate::{
    core::booking::{self, BookingView, BookingWithVenue},
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Body of `POST /bookings`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Venue to book
    pub venue_id: i64,
    /// First night
    pub start_date: String,
    /// Checkout day
    pub end_date: String,
}

/// Body of `PATCH /bookings/:id`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    /// New first night
    pub start_date: String,
    /// New checkout day
    pub end_date: String,
}

/// POST /bookings
pub async fn create_booking(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingView>)> {
    if req.venue_id <= 0 {
        return Err(Error::Validation {
            message: "venueId must be a positive integer".to_string(),
        }
        .into());
    }
    let start = parse_date(&req.start_date)?;
    let end = parse_date(&req.end_date)?;

    let created =
        booking::create_booking(&state.db, caller.user_id(), req.venue_id, start, end).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /bookings/me
/// The caller's bookings, newest first
pub async fn list_my_bookings(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<BookingWithVenue>>> {
    let bookings = booking::list_my_bookings(&state.db, caller.user_id()).await?;
    Ok(Json(bookings))
}

/// PATCH /bookings/:id
/// Moves the booking to new dates at its original nightly rate
pub async fn update_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookingRequest>,
) -> ApiResult<Json<BookingView>> {
    let start = parse_date(&req.start_date)?;
    let end = parse_date(&req.end_date)?;

    let updated =
        booking::update_booking_dates(&state.db, caller.user_id(), id, start, end).await?;
    Ok(Json(updated.into()))
}

/// DELETE /bookings/:id
/// Cancels the booking; the record is kept
pub async fn cancel_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<BookingView>> {
    let cancelled = booking::cancel_booking(&state.db, caller.user_id(), id).await?;
    Ok(Json(cancelled.into()))
}
