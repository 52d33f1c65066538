//! Overlap detection between booking ranges.
//!
//! Two half-open ranges `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && e1 > s2`.
//! Only confirmed bookings take part; cancelled ones never block.

use crate::{
    entities::{Booking, BookingStatus, booking},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{Condition, prelude::*};

/// Pure overlap test for two half-open date ranges.
#[must_use]
pub fn ranges_overlap(
    first_start: NaiveDate,
    first_end: NaiveDate,
    second_start: NaiveDate,
    second_end: NaiveDate,
) -> bool {
    first_start < second_end && first_end > second_start
}

/// Condition selecting confirmed bookings that share a night with `[start, end)`.
#[must_use]
pub fn overlap_condition(start: NaiveDate, end: NaiveDate) -> Condition {
    Condition::all()
        .add(booking::Column::Status.eq(BookingStatus::Confirmed))
        .add(booking::Column::StartDate.lt(end))
        .add(booking::Column::EndDate.gt(start))
}

/// Checks whether any confirmed booking of `venue_id` other than `exclude_booking_id`
/// overlaps `[start, end)`.
///
/// Takes any connection so it can run inside the caller's transaction.
pub async fn has_overlap<C>(
    db: &C,
    venue_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    exclude_booking_id: Option<i64>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut query = Booking::find()
        .filter(booking::Column::VenueId.eq(venue_id))
        .filter(overlap_condition(start, end));

    if let Some(booking_id) = exclude_booking_id {
        query = query.filter(booking::Column::Id.ne(booking_id));
    }

    let clash = query.one(db).await?;
    if let Some(existing) = &clash {
        tracing::debug!(
            venue_id,
            conflicting_booking = existing.id,
            "Requested range overlaps a confirmed booking"
        );
    }
    Ok(clash.is_some())
}
