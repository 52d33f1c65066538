//! Favourite business logic - A user's saved venues.

use crate::{
    core::pricing,
    entities::{Favourite, Venue, VenueAddress, favourite, venue, venue_address},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::OnConflict};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// A favourited venue with the fields a saved-list needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteVenue {
    /// Venue id
    pub venue_id: i64,
    /// Listing title
    pub title: String,
    /// City of the address
    pub city: Option<String>,
    /// Nightly price
    pub price_per_night: Decimal,
    /// Rating
    pub rating: Option<f64>,
    /// Photo album reference
    pub album_id: Option<i64>,
    /// When the venue was favourited
    pub favourited_at: DateTime<Utc>,
}

/// Adds `venue_id` to the user's favourites. Adding twice is a no-op.
///
/// Returns `true` when a new favourite was stored.
///
/// # Errors
/// Returns [`Error::NotFound`] when the venue does not exist.
pub async fn add_favourite(db: &DatabaseConnection, user_id: i64, venue_id: i64) -> Result<bool> {
    Venue::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Venue", venue_id))?;

    let favourite_model = favourite::ActiveModel {
        user_id: Set(user_id),
        venue_id: Set(venue_id),
        created_at: Set(Utc::now()),
    };

    let inserted = Favourite::insert(favourite_model)
        .on_conflict(
            OnConflict::columns([favourite::Column::UserId, favourite::Column::VenueId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        info!(user_id, venue_id, "Favourite added");
    }
    Ok(inserted > 0)
}

/// Removes `venue_id` from the user's favourites.
///
/// # Errors
/// Returns [`Error::NotFound`] when the venue was not a favourite.
pub async fn remove_favourite(db: &DatabaseConnection, user_id: i64, venue_id: i64) -> Result<()> {
    let result = Favourite::delete_many()
        .filter(favourite::Column::UserId.eq(user_id))
        .filter(favourite::Column::VenueId.eq(venue_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Favourite",
            id: format!("{user_id}/{venue_id}"),
        });
    }

    info!(user_id, venue_id, "Favourite removed");
    Ok(())
}

/// Lists the user's favourite venues, most recently favourited first.
pub async fn list_favourites(db: &DatabaseConnection, user_id: i64) -> Result<Vec<FavouriteVenue>> {
    let rows: Vec<(favourite::Model, Option<venue::Model>)> = Favourite::find()
        .filter(favourite::Column::UserId.eq(user_id))
        .order_by_desc(favourite::Column::CreatedAt)
        .order_by_desc(favourite::Column::VenueId)
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
            .filter(venue_address::Column::Id.is_in(address_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|address| (address.id, address.city))
            .collect()
    };

    Ok(rows
        .into_iter()
        .filter_map(|(favourite, venue)| {
            let venue = venue?;
            Some(FavouriteVenue {
                venue_id: venue.id,
                city: venue.address_id.and_then(|id| cities.get(&id).cloned()),
                price_per_night: pricing::from_cents(venue.price_per_night_cents),
                rating: venue.rating,
                album_id: venue.album_id,
                favourited_at: favourite.created_at,
                title: venue.title,
            })
        })
        .collect())
}

/// Ids of the user's favourite venues, ascending.
pub async fn list_favourite_venue_ids(db: &DatabaseConnection, user_id: i64) -> Result<Vec<i64>> {
    Favourite::find()
        .select_only()
        .column(favourite::Column::VenueId)
        .filter(favourite::Column::UserId.eq(user_id))
        .order_by_asc(favourite::Column::VenueId)
        .into_tuple::<i64>()
        .all(db)
        .await
        .map_err(Into::into)
}
