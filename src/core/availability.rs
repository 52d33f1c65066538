//! Availability labels for listed venues.
//!
//! Availability is informational: it never removes a venue from a listing.

use serde::Serialize;

/// Availability of a venue for the requested stay, from the caller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    /// No date range was requested
    Unknown,
    /// No confirmed booking overlaps the range
    Available,
    /// Someone else holds at least one overlapping night
    Booked,
    /// The caller holds at least one overlapping night
    BookedByMe,
}

/// Classifies a venue given the guests of its confirmed bookings overlapping the
/// requested range.
///
/// The caller's own overlapping booking wins over any number of foreign ones.
#[must_use]
pub fn classify(
    has_date_range: bool,
    overlapping_guests: &[Option<i64>],
    current_user_id: Option<i64>,
) -> AvailabilityStatus {
    if !has_date_range {
        return AvailabilityStatus::Unknown;
    }
    if overlapping_guests.is_empty() {
        return AvailabilityStatus::Available;
    }
    let mine = current_user_id
        .is_some_and(|caller| overlapping_guests.iter().any(|guest| *guest == Some(caller)));
    if mine {
        AvailabilityStatus::BookedByMe
    } else {
        AvailabilityStatus::Booked
    }
}
