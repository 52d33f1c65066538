//! Venue entity - A bookable listing owned by a host.
//!
//! The nightly price is kept in minor currency units (cents) so that storage
//! never rounds; the domain layer converts to a two-decimal `Decimal`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Venue database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venues")]
pub struct Model {
    /// Unique identifier for the venue
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Listing title
    pub title: String,
    /// URL-safe identifier derived from the title
    #[sea_orm(unique)]
    pub slug: String,
    /// Free-form description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Nightly price in cents, never negative
    pub price_per_night_cents: i64,
    /// Maximum number of guests, at least 1
    pub capacity: i32,
    /// Optional photo album reference
    pub album_id: Option<i64>,
    /// Optional average rating
    pub rating: Option<f64>,
    /// Owning host
    pub host_id: i64,
    /// Optional address, exclusively owned by this venue
    #[sea_orm(unique)]
    pub address_id: Option<i64>,
    /// When the venue was created
    pub created_at: DateTimeUtc,
    /// When the venue was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Venue and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each venue is hosted by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::HostId",
        to = "super::user::Column::Id"
    )]
    Host,
    /// Each venue has at most one address
    #[sea_orm(
        belongs_to = "super::venue_address::Entity",
        from = "Column::AddressId",
        to = "super::venue_address::Column::Id"
    )]
    Address,
    /// One venue has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One venue has many feature attachments
    #[sea_orm(has_many = "super::venue_feature::Entity")]
    VenueFeatures,
    /// One venue is favourited by many users
    #[sea_orm(has_many = "super::favourite::Entity")]
    Favourites,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl Related<super::venue_address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::venue_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VenueFeatures.def()
    }
}

impl Related<super::favourite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favourites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
