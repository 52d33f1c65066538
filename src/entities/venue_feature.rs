//! Venue feature entity - Junction between venues and features.
//!
//! The composite primary key prevents attaching the same feature twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Venue/feature junction model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venue_features")]
pub struct Model {
    /// Venue half of the key
    #[sea_orm(primary_key, auto_increment = false)]
    pub venue_id: i64,
    /// Feature half of the key
    #[sea_orm(primary_key, auto_increment = false)]
    pub feature_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id",
        on_delete = "Cascade"
    )]
    Venue,
    #[sea_orm(
        belongs_to = "super::feature::Entity",
        from = "Column::FeatureId",
        to = "super::feature::Column::Id",
        on_delete = "Cascade"
    )]
    Feature,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl Related<super::feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feature.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
