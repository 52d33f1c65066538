//! User address entity - Postal address attached to at most one user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User address database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_addresses")]
pub struct Model {
    /// Unique identifier for the address
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Street and house number
    pub street: String,
    /// City name
    pub city: String,
    /// Country code or name
    pub country: String,
}

/// Defines relationships between `UserAddress` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The user owning this address
    #[sea_orm(has_one = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
