//! Feature entity - A named amenity (e.g. "Wifi") that venues can advertise.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "features")]
pub struct Model {
    /// Unique identifier for the feature
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Feature name; the exact (case-sensitive) string is the identity key
    #[sea_orm(unique)]
    pub name: String,
    /// Lowercased name, written on insert and matched by the listing filter
    #[serde(skip)]
    pub name_key: String,
}

/// Defines relationships between Feature and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One feature is attached to many venues through the junction table
    #[sea_orm(has_many = "super::venue_feature::Entity")]
    VenueFeatures,
}

impl Related<super::venue_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VenueFeatures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
