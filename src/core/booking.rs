//! Booking business logic - Handles the booking lifecycle.
//!
//! A booking moves `(none) -> CONFIRMED -> CANCELLED`; cancellation is terminal and
//! keeps the record. Creation and date changes run the overlap check and the write
//! in one serializable transaction, so two concurrent requests for the same nights
//! cannot both commit.
//!
//! Changing dates keeps the per-night rate the guest was originally charged
//! (`stored total / stored nights`); the venue's current price is not consulted.

use crate::{
    core::{overlap, pricing},
    entities::{Booking, BookingStatus, Venue, VenueAddress, booking, venue},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{IsolationLevel, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Booking as returned to callers, with the price as a decimal amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    /// Booking id
    pub id: i64,
    /// Booked venue
    pub venue_id: i64,
    /// Guest, if the account still exists
    pub user_id: Option<i64>,
    /// First night
    pub start_date: NaiveDate,
    /// Checkout day
    pub end_date: NaiveDate,
    /// Lifecycle state
    pub status: BookingStatus,
    /// Total price for the stay
    pub total_price: Decimal,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl From<booking::Model> for BookingView {
    fn from(model: booking::Model) -> Self {
        Self {
            id: model.id,
            venue_id: model.venue_id,
            user_id: model.user_id,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status,
            total_price: pricing::from_cents(model.total_price_cents),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Minimal venue information shown next to a guest's booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedVenueSummary {
    /// Venue id
    pub id: i64,
    /// Venue title
    pub title: String,
    /// City of the venue address, if any
    pub city: Option<String>,
}

/// A guest's booking together with the venue it is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithVenue {
    /// The booking
    #[serde(flatten)]
    pub booking: BookingView,
    /// The venue, absent only if it vanished underneath the booking
    pub venue: Option<BookedVenueSummary>,
}

/// Books `venue_id` for `caller_id` over `[start, end)`.
///
/// The total is `nights * venue price` at the time of booking.
///
/// # Errors
/// * [`Error::InvalidDateRange`] when `end <= start`
/// * [`Error::NotFound`] when the venue does not exist
/// * [`Error::BookingOverlap`] when a confirmed booking shares a night
pub async fn create_booking(
    db: &DatabaseConnection,
    caller_id: i64,
    venue_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<booking::Model> {
    let nights = pricing::nights(start, end)?;

    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let venue = Venue::find_by_id(venue_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Venue", venue_id))?;

    if overlap::has_overlap(&txn, venue_id, start, end, None).await? {
        warn!(venue_id, %start, %end, "Rejected booking: dates overlap");
        return Err(Error::BookingOverlap { venue_id });
    }

    let total = pricing::compute_total(nights, pricing::from_cents(venue.price_per_night_cents))?;

    let now = Utc::now();
    let booking_model = booking::ActiveModel {
        venue_id: Set(venue_id),
        user_id: Set(Some(caller_id)),
        start_date: Set(start),
        end_date: Set(end),
        status: Set(BookingStatus::Confirmed),
        total_price_cents: Set(pricing::to_cents(total)?),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = booking_model.insert(&txn).await?;
    txn.commit().await?;

    info!(
        booking_id = result.id,
        venue_id,
        user_id = caller_id,
        nights,
        %total,
        "Booking created"
    );
    Ok(result)
}

/// Retrieves a booking by id.
pub async fn get_booking_by_id(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<Option<booking::Model>> {
    Booking::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_owned_booking<C>(db: &C, caller_id: i64, booking_id: i64) -> Result<booking::Model>
where
    C: ConnectionTrait,
{
    let booking = Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Booking", booking_id))?;

    if booking.user_id != Some(caller_id) {
        warn!(booking_id, caller_id, "Rejected booking change by non-owner");
        return Err(Error::Forbidden {
            entity: "Booking",
            id: booking_id,
            user_id: caller_id,
        });
    }
    Ok(booking)
}

/// Moves a booking to `[new_start, new_end)`, keeping its locked nightly rate.
///
/// # Errors
/// * [`Error::NotFound`] when the booking does not exist
/// * [`Error::Forbidden`] when the caller is not the guest
/// * [`Error::InvalidDateRange`] when `new_end <= new_start`
/// * [`Error::Validation`] when the booking is already cancelled
/// * [`Error::BookingOverlap`] when another confirmed booking shares a night
/// * [`Error::CorruptedBooking`] when the stored range has no nights
pub async fn update_booking_dates(
    db: &DatabaseConnection,
    caller_id: i64,
    booking_id: i64,
    new_start: NaiveDate,
    new_end: NaiveDate,
) -> Result<booking::Model> {
    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let booking = find_owned_booking(&txn, caller_id, booking_id).await?;
    let new_nights = pricing::nights(new_start, new_end)?;

    if booking.status == BookingStatus::Cancelled {
        return Err(Error::Validation {
            message: format!("Booking {booking_id} is cancelled and cannot be changed"),
        });
    }

    if overlap::has_overlap(&txn, booking.venue_id, new_start, new_end, Some(booking_id)).await? {
        warn!(booking_id, %new_start, %new_end, "Rejected date change: dates overlap");
        return Err(Error::BookingOverlap {
            venue_id: booking.venue_id,
        });
    }

    let rate = pricing::locked_rate(
        booking.id,
        pricing::from_cents(booking.total_price_cents),
        booking.start_date,
        booking.end_date,
    )?;
    let total = pricing::compute_total(new_nights, rate)?;

    let mut active_model: booking::ActiveModel = booking.into();
    active_model.start_date = Set(new_start);
    active_model.end_date = Set(new_end);
    active_model.total_price_cents = Set(pricing::to_cents(total)?);
    active_model.updated_at = Set(Utc::now());

    let result = active_model.update(&txn).await?;
    txn.commit().await?;

    info!(booking_id, new_nights, %total, "Booking dates changed");
    Ok(result)
}

/// Cancels a booking. Dates and price are left untouched; cancelling twice is a no-op.
///
/// # Errors
/// * [`Error::NotFound`] when the booking does not exist
/// * [`Error::Forbidden`] when the caller is not the guest
pub async fn cancel_booking(
    db: &DatabaseConnection,
    caller_id: i64,
    booking_id: i64,
) -> Result<booking::Model> {
    let booking = find_owned_booking(db, caller_id, booking_id).await?;

    let mut active_model: booking::ActiveModel = booking.into();
    active_model.status = Set(BookingStatus::Cancelled);
    active_model.updated_at = Set(Utc::now());

    let result = active_model.update(db).await?;
    info!(booking_id, "Booking cancelled");
    Ok(result)
}

/// Lists the caller's bookings, newest first, each with a short venue summary.
pub async fn list_my_bookings(
    db: &DatabaseConnection,
    caller_id: i64,
) -> Result<Vec<BookingWithVenue>> {
    let rows: Vec<(booking::Model, Option<venue::Model>)> = Booking::find()
        .filter(booking::Column::UserId.eq(caller_id))
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id)
        .find_also_related(Venue)
        .all(db)
        .await?;

    let address_ids: Vec<i64> = rows
        .iter()
        .filter_map(|(_, venue)| venue.as_ref().and_then(|v| v.address_id))
        .collect();
    let cities: HashMap<i64, String> = if address_ids.is_empty() {
        HashMap::new()
    } else {
        VenueAddress::find()
            .filter(crate::entities::venue_address::Column::Id.is_in(address_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|address| (address.id, address.city))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|(booking, venue)| BookingWithVenue {
            booking: booking.into(),
            venue: venue.map(|v| BookedVenueSummary {
                city: v.address_id.and_then(|id| cities.get(&id).cloned()),
                id: v.id,
                title: v.title,
            }),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::overlap::ranges_overlap;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_booking_rejects_invalid_range() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_booking(&db, 1, 1, date(2024, 1, 4), date(2024, 1, 4)).await;
        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));

        let result = create_booking(&db, 1, 1, date(2024, 1, 4), date(2024, 1, 1)).await;
        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_venue_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();

        let result = create_booking(&db, 1, 999, date(2024, 1, 1), date(2024, 1, 4)).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "Venue",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_computes_total() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;

        let booking = create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4))
            .await?;

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.user_id, Some(guest.id));
        assert_eq!(booking.total_price_cents, 30_000);
        assert_eq!(
            BookingView::from(booking).total_price,
            Decimal::new(30_000, 2)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_rejects_overlap() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let first_guest = create_test_user(&db, "first@example.com").await?;
        let second_guest = create_test_user(&db, "second@example.com").await?;

        create_booking(&db, first_guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;

        let result =
            create_booking(&db, second_guest.id, venue.id, date(2024, 1, 3), date(2024, 1, 6))
                .await;
        assert!(matches!(result, Err(Error::BookingOverlap { .. })));

        // Checkout day is free for the next guest
        create_booking(&db, second_guest.id, venue.id, date(2024, 1, 4), date(2024, 1, 6))
            .await?;

        let confirmed = Booking::find()
            .filter(booking::Column::VenueId.eq(venue.id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
            .all(&db)
            .await?;
        for (i, a) in confirmed.iter().enumerate() {
            for b in confirmed.iter().skip(i + 1) {
                assert!(!ranges_overlap(
                    a.start_date,
                    a.end_date,
                    b.start_date,
                    b.end_date
                ));
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_dates() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;

        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;
        cancel_booking(&db, guest.id, booking.id).await?;

        create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_locked_rate_after_price_change() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;

        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;
        assert_eq!(booking.total_price_cents, 30_000);

        // Host raises the price to 150.00 after the booking was made
        let mut raised: venue::ActiveModel = venue.into();
        raised.price_per_night_cents = Set(15_000);
        raised.update(&db).await?;

        let updated =
            update_booking_dates(&db, guest.id, booking.id, date(2024, 1, 1), date(2024, 1, 6))
                .await?;
        assert_eq!(updated.total_price_cents, 50_000);
        assert_eq!(updated.start_date, date(2024, 1, 1));
        assert_eq!(updated.end_date, date(2024, 1, 6));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_to_same_dates_keeps_total() -> Result<()> {
        let db = setup_test_db().await?;
        let host = create_test_user(&db, "host@example.com").await?;
        let venue = create_custom_venue(
            &db,
            host.id,
            new_venue("Odd Price", Decimal::new(3_333, 2), 2, "Gdansk", &[]),
        )
        .await?;
        let guest = create_test_user(&db, "guest@example.com").await?;

        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 3, 1), date(2024, 3, 4)).await?;
        assert_eq!(booking.total_price_cents, 9_999);

        let updated =
            update_booking_dates(&db, guest.id, booking.id, date(2024, 3, 1), date(2024, 3, 4))
                .await?;
        assert_eq!(updated.total_price_cents, booking.total_price_cents);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_non_owner() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let intruder = create_test_user(&db, "intruder@example.com").await?;

        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;

        let result =
            update_booking_dates(&db, intruder.id, booking.id, date(2024, 1, 1), date(2024, 1, 2))
                .await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        let result = cancel_booking(&db, intruder.id, booking.id).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_validates_dates_and_overlap() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let other = create_test_user(&db, "other@example.com").await?;

        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;
        create_booking(&db, other.id, venue.id, date(2024, 1, 10), date(2024, 1, 12)).await?;

        let result =
            update_booking_dates(&db, guest.id, booking.id, date(2024, 1, 5), date(2024, 1, 5))
                .await;
        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));

        let result =
            update_booking_dates(&db, guest.id, booking.id, date(2024, 1, 8), date(2024, 1, 11))
                .await;
        assert!(matches!(result, Err(Error::BookingOverlap { .. })));

        // Overlapping its own previous range is fine
        update_booking_dates(&db, guest.id, booking.id, date(2024, 1, 2), date(2024, 1, 5))
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_booking() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_booking_dates(&db, 1, 999, date(2024, 1, 1), date(2024, 1, 2)).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "Booking",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_fails_on_corrupted_stored_range() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;

        let mut corrupted: booking::ActiveModel = booking.clone().into();
        corrupted.end_date = Set(date(2024, 1, 1));
        corrupted.update(&db).await?;

        let result =
            update_booking_dates(&db, guest.id, booking.id, date(2024, 2, 1), date(2024, 2, 3))
                .await;
        assert!(matches!(result, Err(Error::CorruptedBooking { nights: 0, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_keeps_dates_and_price() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let booking =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;

        let cancelled = cancel_booking(&db, guest.id, booking.id).await?;
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.start_date, booking.start_date);
        assert_eq!(cancelled.end_date, booking.end_date);
        assert_eq!(cancelled.total_price_cents, booking.total_price_cents);

        // Repeated cancel changes nothing
        let again = cancel_booking(&db, guest.id, booking.id).await?;
        assert_eq!(again.status, BookingStatus::Cancelled);

        let result =
            update_booking_dates(&db, guest.id, booking.id, date(2024, 2, 1), date(2024, 2, 3))
                .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_my_bookings_newest_first_with_venue() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let other = create_test_user(&db, "other@example.com").await?;

        let older =
            create_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 4)).await?;
        let newer =
            create_booking(&db, guest.id, venue.id, date(2024, 2, 1), date(2024, 2, 4)).await?;
        create_booking(&db, other.id, venue.id, date(2024, 3, 1), date(2024, 3, 4)).await?;

        let mine = list_my_bookings(&db, guest.id).await?;
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].booking.id, newer.id);
        assert_eq!(mine[1].booking.id, older.id);

        let summary = mine[0].venue.as_ref().unwrap();
        assert_eq!(summary.id, venue.id);
        assert_eq!(summary.title, venue.title);
        assert_eq!(summary.city.as_deref(), Some("Krakow"));
        Ok(())
    }
}
