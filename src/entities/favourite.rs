//! Favourite entity - Pure membership of a venue in a user's favourites.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Favourite database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favourites")]
pub struct Model {
    /// User who favourited the venue
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// The favourited venue
    #[sea_orm(primary_key, auto_increment = false)]
    pub venue_id: i64,
    /// When the venue was favourited
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Favourite and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each favourite belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each favourite points at one venue; removed with the venue
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id",
        on_delete = "Cascade"
    )]
    Venue,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
