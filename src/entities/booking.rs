//! Booking entity - A guest's reservation of a venue for a range of nights.
//!
//! The range is half-open: `start_date` is the first night, `end_date` the
//! checkout day. `user_id` becomes NULL when the guest deletes their account,
//! so the row survives for history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking; `Cancelled` is terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Holds the nights; participates in overlap checks
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    /// Released; never blocks other bookings
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Booked venue
    pub venue_id: i64,
    /// Guest who booked; None once the guest account is deleted
    pub user_id: Option<i64>,
    /// First night (inclusive)
    pub start_date: Date,
    /// Checkout day (exclusive)
    pub end_date: Date,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// Price charged for the whole stay, in cents
    pub total_price_cents: i64,
    /// When the booking was created
    pub created_at: DateTimeUtc,
    /// When the booking was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking belongs to one venue; blocks venue deletion while present
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id"
    )]
    Venue,
    /// Each booking was made by at most one (still existing) user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
