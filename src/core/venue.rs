//! Venue business logic - Creating venues, reading their details and listing them.
//!
//! Listing runs the composed query plan inside one transaction so that the total
//! count and the fetched page come from the same snapshot.

use crate::{
    core::{
        availability::{self, AvailabilityStatus},
        pricing,
        venue_query::{self, VenueListParams},
    },
    entities::{
        Booking, Favourite, Feature, User, Venue, VenueAddress, VenueFeature, booking, favourite,
        feature, venue, venue_address, venue_feature,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Longest accepted venue title
pub const MAX_TITLE_LEN: usize = 200;

/// Input for creating a venue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVenue {
    /// Listing title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Nightly price, rounded to cents when stored
    pub price_per_night: Decimal,
    /// Maximum number of guests
    pub capacity: i32,
    /// Optional photo album reference
    #[serde(default)]
    pub album_id: Option<i64>,
    /// Optional rating
    #[serde(default)]
    pub rating: Option<f64>,
    /// Street of the venue address
    pub street: String,
    /// City of the venue address
    pub city: String,
    /// Country of the venue address
    pub country: String,
    /// Optional postal code
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Feature names to attach; unknown names are created
    #[serde(default)]
    pub features: Vec<String>,
}

/// Full venue address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    /// Street
    pub street: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
    /// Postal code
    pub postal_code: Option<String>,
}

impl From<venue_address::Model> for AddressView {
    fn from(model: venue_address::Model) -> Self {
        Self {
            street: model.street,
            city: model.city,
            country: model.country,
            postal_code: model.postal_code,
        }
    }
}

/// Venue as shown in a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueCard {
    /// Venue id
    pub id: i64,
    /// Listing title
    pub title: String,
    /// City of the address
    pub city: Option<String>,
    /// Postal code of the address
    pub postal_code: Option<String>,
    /// Nightly price
    pub price_per_night: Decimal,
    /// Rating
    pub rating: Option<f64>,
    /// Maximum number of guests
    pub capacity: i32,
    /// Photo album reference
    pub album_id: Option<i64>,
    /// Attached feature names
    pub features: Vec<String>,
    /// Whether the caller favourited the venue
    pub is_favourite: bool,
    /// Availability for the requested stay
    pub availability_status: AvailabilityStatus,
}

/// One page of a venue listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueListPage {
    /// Venues on this page
    pub items: Vec<VenueCard>,
    /// Venues matching the filters across all pages
    pub total_count: u64,
}

/// Everything known about a single venue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDetail {
    /// Venue id
    pub id: i64,
    /// Listing title
    pub title: String,
    /// URL-safe identifier
    pub slug: String,
    /// Description
    pub description: String,
    /// Nightly price
    pub price_per_night: Decimal,
    /// Maximum number of guests
    pub capacity: i32,
    /// Photo album reference
    pub album_id: Option<i64>,
    /// Rating
    pub rating: Option<f64>,
    /// Owning host
    pub host_id: i64,
    /// Address, if any
    pub address: Option<AddressView>,
    /// Attached feature names
    pub features: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

fn validate_new_venue(new_venue: &NewVenue) -> Result<()> {
    let title = new_venue.title.trim();
    if title.is_empty() {
        return Err(Error::Validation {
            message: "Venue title cannot be empty".to_string(),
        });
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::Validation {
            message: format!("Venue title must be at most {MAX_TITLE_LEN} characters"),
        });
    }
    if new_venue.price_per_night.is_sign_negative() {
        return Err(Error::Validation {
            message: "Price per night cannot be negative".to_string(),
        });
    }
    if new_venue.capacity < 1 {
        return Err(Error::Validation {
            message: "Capacity must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Finds a feature by its exact name, creating it when missing.
async fn upsert_feature<C>(db: &C, name: &str) -> Result<feature::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = Feature::find()
        .filter(feature::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    feature::ActiveModel {
        name: Set(name.to_string()),
        name_key: Set(venue_query::fold_case(name)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a venue owned by `host_id`, together with its address and features.
///
/// # Errors
/// * [`Error::Validation`] for an empty or overlong title, a negative price or a
///   capacity below 1
/// * [`Error::NotFound`] when the host does not exist
pub async fn create_venue_for_host(
    db: &DatabaseConnection,
    host_id: i64,
    new_venue: NewVenue,
) -> Result<venue::Model> {
    validate_new_venue(&new_venue)?;
    let price_cents = pricing::to_cents(new_venue.price_per_night)?;

    let txn = db.begin().await?;

    User::find_by_id(host_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("User", host_id))?;

    let mut feature_ids = Vec::new();
    for name in new_venue
        .features
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
    {
        let feature = upsert_feature(&txn, name).await?;
        if !feature_ids.contains(&feature.id) {
            feature_ids.push(feature.id);
        }
    }

    let address = venue_address::ActiveModel {
        street: Set(new_venue.street),
        city_key: Set(venue_query::fold_case(&new_venue.city)),
        city: Set(new_venue.city),
        country: Set(new_venue.country),
        postal_code: Set(new_venue.postal_code),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let title = new_venue.title.trim().to_string();
    let now = Utc::now();
    let created = venue::ActiveModel {
        slug: Set(slug::slugify(format!("{title}-{}", now.timestamp_millis()))),
        title: Set(title),
        description: Set(new_venue.description),
        price_per_night_cents: Set(price_cents),
        capacity: Set(new_venue.capacity),
        album_id: Set(new_venue.album_id),
        rating: Set(new_venue.rating),
        host_id: Set(host_id),
        address_id: Set(Some(address.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for feature_id in feature_ids {
        venue_feature::ActiveModel {
            venue_id: Set(created.id),
            feature_id: Set(feature_id),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    info!(venue_id = created.id, host_id, slug = %created.slug, "Venue created");
    Ok(created)
}

async fn load_feature_names<C>(db: &C, venue_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>>
where
    C: ConnectionTrait,
{
    let mut names: HashMap<i64, Vec<String>> = HashMap::new();
    if venue_ids.is_empty() {
        return Ok(names);
    }

    let rows = VenueFeature::find()
        .filter(venue_feature::Column::VenueId.is_in(venue_ids.iter().copied()))
        .find_also_related(Feature)
        .all(db)
        .await?;

    for (link, feature) in rows {
        if let Some(feature) = feature {
            names.entry(link.venue_id).or_default().push(feature.name);
        }
    }
    for list in names.values_mut() {
        list.sort();
    }
    Ok(names)
}

async fn load_addresses<C>(
    db: &C,
    venues: &[venue::Model],
) -> Result<HashMap<i64, venue_address::Model>>
where
    C: ConnectionTrait,
{
    let address_ids: Vec<i64> = venues.iter().filter_map(|v| v.address_id).collect();
    if address_ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(VenueAddress::find()
        .filter(venue_address::Column::Id.is_in(address_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|address| (address.id, address))
        .collect())
}

/// Returns the full detail of a venue.
///
/// # Errors
/// Returns [`Error::NotFound`] when the venue does not exist.
pub async fn get_venue_detail(db: &DatabaseConnection, venue_id: i64) -> Result<VenueDetail> {
    let venue = Venue::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Venue", venue_id))?;

    let address = match venue.address_id {
        Some(address_id) => VenueAddress::find_by_id(address_id).one(db).await?,
        None => None,
    };
    let mut features = load_feature_names(db, &[venue.id]).await?;

    Ok(VenueDetail {
        id: venue.id,
        features: features.remove(&venue.id).unwrap_or_default(),
        address: address.map(Into::into),
        title: venue.title,
        slug: venue.slug,
        description: venue.description,
        price_per_night: pricing::from_cents(venue.price_per_night_cents),
        capacity: venue.capacity,
        album_id: venue.album_id,
        rating: venue.rating,
        host_id: venue.host_id,
        created_at: venue.created_at,
        updated_at: venue.updated_at,
    })
}

/// Lists one page of venues matching `params`.
///
/// Each card carries the caller's favourite flag and, when a stay was
/// requested, its availability. `total_count` ignores paging; a page past the
/// last match is empty.
///
/// # Errors
/// Returns [`Error::Database`] if a query fails.
pub async fn list_venues(
    db: &DatabaseConnection,
    params: &VenueListParams,
) -> Result<VenueListPage> {
    let plan = venue_query::compose(params);

    let txn = db.begin().await?;

    let total_count = plan.count_select().count(&txn).await?;
    let offset = plan.pagination.offset();
    let venues = if offset < total_count {
        plan.select()
            .offset(offset)
            .limit(plan.pagination.per_page)
            .all(&txn)
            .await?
    } else {
        Vec::new()
    };
    let venue_ids: Vec<i64> = venues.iter().map(|v| v.id).collect();

    let mut features = load_feature_names(&txn, &venue_ids).await?;
    let addresses = load_addresses(&txn, &venues).await?;

    let mut overlapping: HashMap<i64, Vec<Option<i64>>> = HashMap::new();
    if let (Some(window), false) = (plan.availability, venue_ids.is_empty()) {
        let bookings = Booking::find()
            .filter(booking::Column::VenueId.is_in(venue_ids.iter().copied()))
            .filter(window.bookings_condition())
            .all(&txn)
            .await?;
        for booking in bookings {
            overlapping
                .entry(booking.venue_id)
                .or_default()
                .push(booking.user_id);
        }
    }

    let favourites: HashSet<i64> = match plan.current_user_id {
        Some(user_id) if !venue_ids.is_empty() => Favourite::find()
            .filter(favourite::Column::UserId.eq(user_id))
            .filter(favourite::Column::VenueId.is_in(venue_ids.iter().copied()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|f| f.venue_id)
            .collect(),
        _ => HashSet::new(),
    };

    txn.commit().await?;

    let has_range = plan.availability.is_some();
    let items = venues
        .into_iter()
        .map(|venue| {
            let address = venue.address_id.and_then(|id| addresses.get(&id));
            let guests = overlapping.get(&venue.id).map_or(&[][..], Vec::as_slice);
            VenueCard {
                id: venue.id,
                city: address.map(|a| a.city.clone()),
                postal_code: address.and_then(|a| a.postal_code.clone()),
                price_per_night: pricing::from_cents(venue.price_per_night_cents),
                rating: venue.rating,
                capacity: venue.capacity,
                album_id: venue.album_id,
                features: features.remove(&venue.id).unwrap_or_default(),
                is_favourite: favourites.contains(&venue.id),
                availability_status: availability::classify(
                    has_range,
                    guests,
                    plan.current_user_id,
                ),
                title: venue.title,
            }
        })
        .collect();

    Ok(VenueListPage { items, total_count })
}
