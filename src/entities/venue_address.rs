//! Venue address entity - Location of a venue.
//!
//! Each address is owned exclusively by one venue and is removed together with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Venue address database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venue_addresses")]
pub struct Model {
    /// Unique identifier for the address
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Street and house number
    pub street: String,
    /// City name as entered
    pub city: String,
    /// Lowercased city, written on insert and searched by the listing filter
    #[serde(skip)]
    pub city_key: String,
    /// Country code or name
    pub country: String,
    /// Optional postal code
    pub postal_code: Option<String>,
}

/// Defines relationships between `VenueAddress` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The venue located at this address
    #[sea_orm(has_one = "super::venue::Entity")]
    Venue,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
