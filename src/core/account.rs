//! Account deletion - Removes a user and everything hanging off their account.
//!
//! All steps run in one transaction, in an order that keeps every foreign key
//! satisfiable:
//!
//! 1. the user must exist
//! 2. collect the venues they host, with their addresses
//! 3. cancel, then delete, every booking at those venues
//! 4. delete the venues (feature links and favourites of those venues first)
//! 5. delete the venues' addresses
//! 6. cancel the user's own guest bookings and detach them from the user
//! 7. delete the user's favourites
//! 8. delete the user, then the user's address
//!
//! Any failure drops the transaction, so no partial cascade is ever committed.

use crate::{
    entities::{
        Booking, BookingStatus, Favourite, User, UserAddress, Venue, VenueAddress, VenueFeature,
        booking, favourite, venue, venue_feature,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QuerySelect, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{info, instrument};

/// What an account deletion removed or detached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeletionSummary {
    /// Venues hosted by the user that were deleted
    pub venues_deleted: u64,
    /// Bookings at those venues that were cancelled and deleted
    pub venue_bookings_deleted: u64,
    /// Addresses of the deleted venues
    pub venue_addresses_deleted: u64,
    /// The user's own bookings, cancelled and kept without a guest
    pub guest_bookings_detached: u64,
    /// Favourites the user kept
    pub favourites_deleted: u64,
}

/// Deletes `user_id` and cascades through venues, bookings, addresses and favourites.
///
/// # Errors
/// * [`Error::NotFound`] when the user does not exist
/// * [`Error::ForeignKeyViolation`] when a step leaves a dangling reference
pub async fn delete_user_account(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<AccountDeletionSummary> {
    let txn = db.begin().await?;
    let summary = delete_user_account_in(&txn, user_id).await?;
    txn.commit().await?;

    info!(user_id, ?summary, "Account deleted");
    Ok(summary)
}

#[instrument(skip(db))]
async fn delete_user_account_in<C>(db: &C, user_id: i64) -> Result<AccountDeletionSummary>
where
    C: ConnectionTrait,
{
    let mut summary = AccountDeletionSummary::default();

    // 1
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    // 2
    let hosted: Vec<(i64, Option<i64>)> = Venue::find()
        .select_only()
        .column(venue::Column::Id)
        .column(venue::Column::AddressId)
        .filter(venue::Column::HostId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    let venue_ids: Vec<i64> = hosted.iter().map(|(id, _)| *id).collect();
    let venue_address_ids: Vec<i64> = hosted.iter().filter_map(|(_, address)| *address).collect();

    if !venue_ids.is_empty() {
        // 3
        Booking::update_many()
            .col_expr(booking::Column::Status, Expr::value(BookingStatus::Cancelled))
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::VenueId.is_in(venue_ids.iter().copied()))
            .exec(db)
            .await?;
        summary.venue_bookings_deleted = Booking::delete_many()
            .filter(booking::Column::VenueId.is_in(venue_ids.iter().copied()))
            .exec(db)
            .await?
            .rows_affected;

        // 4
        VenueFeature::delete_many()
            .filter(venue_feature::Column::VenueId.is_in(venue_ids.iter().copied()))
            .exec(db)
            .await?;
        Favourite::delete_many()
            .filter(favourite::Column::VenueId.is_in(venue_ids.iter().copied()))
            .exec(db)
            .await?;
        summary.venues_deleted = Venue::delete_many()
            .filter(venue::Column::Id.is_in(venue_ids))
            .exec(db)
            .await?
            .rows_affected;
    }

    // 5
    if !venue_address_ids.is_empty() {
        summary.venue_addresses_deleted = VenueAddress::delete_many()
            .filter(crate::entities::venue_address::Column::Id.is_in(venue_address_ids))
            .exec(db)
            .await?
            .rows_affected;
    }

    // 6
    summary.guest_bookings_detached = Booking::update_many()
        .col_expr(booking::Column::Status, Expr::value(BookingStatus::Cancelled))
        .col_expr(booking::Column::UserId, Expr::value(Option::<i64>::None))
        .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(booking::Column::UserId.eq(user_id))
        .exec(db)
        .await?
        .rows_affected;

    // 7
    summary.favourites_deleted = Favourite::delete_many()
        .filter(favourite::Column::UserId.eq(user_id))
        .exec(db)
        .await?
        .rows_affected;

    // 8
    User::delete_by_id(user_id).exec(db).await?;
    if let Some(address_id) = user.address_id {
        UserAddress::delete_by_id(address_id).exec(db).await?;
    }

    Ok(summary)
}
