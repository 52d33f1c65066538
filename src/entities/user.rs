//! User entity - Represents an account that can host venues and book them as a guest.
//!
//! Credentials are stored already hashed; producing the hash is not this crate's job.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// Hashed credential
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional contact phone number
    pub phone_number: Option<String>,
    /// Optional postal address of the user
    #[sea_orm(unique)]
    pub address_id: Option<i64>,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each user may have one address
    #[sea_orm(
        belongs_to = "super::user_address::Entity",
        from = "Column::AddressId",
        to = "super::user_address::Column::Id"
    )]
    Address,
    /// One user hosts many venues
    #[sea_orm(has_many = "super::venue::Entity")]
    Venues,
    /// One user makes many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One user keeps many favourites
    #[sea_orm(has_many = "super::favourite::Entity")]
    Favourites,
}

impl Related<super::user_address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venues.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::favourite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favourites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
