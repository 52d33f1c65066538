//! Shared test utilities for the booking backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        booking,
        user::{self, NewUser},
        venue::{self, NewVenue},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date; panics on an impossible date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a test user with the given email.
///
/// # Defaults
/// * `name`: "Test User"
/// * `password_hash`: "not-a-real-hash"
/// * no phone number, no address
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::UserModel> {
    user::create_user(
        db,
        NewUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            phone_number: None,
            address: None,
        },
    )
    .await
}

/// Builds venue input with custom parameters.
/// Use this with [`create_custom_venue`] when a test needs a specific venue.
pub fn new_venue(
    title: &str,
    price_per_night: Decimal,
    capacity: i32,
    city: &str,
    features: &[&str],
) -> NewVenue {
    NewVenue {
        title: title.to_string(),
        description: format!("{title} description"),
        price_per_night,
        capacity,
        album_id: None,
        rating: None,
        street: "Testowa 1".to_string(),
        city: city.to_string(),
        country: "PL".to_string(),
        postal_code: Some("00-001".to_string()),
        features: features.iter().map(ToString::to_string).collect(),
    }
}

/// Creates a venue from custom input.
pub async fn create_custom_venue(
    db: &DatabaseConnection,
    host_id: i64,
    input: NewVenue,
) -> Result<entities::VenueModel> {
    venue::create_venue_for_host(db, host_id, input).await
}

/// Creates a test venue with sensible defaults.
///
/// # Defaults
/// * price: 100.00 per night
/// * capacity: 4
/// * city: "Krakow"
/// * no features
pub async fn create_test_venue(
    db: &DatabaseConnection,
    host_id: i64,
    title: &str,
) -> Result<entities::VenueModel> {
    create_custom_venue(
        db,
        host_id,
        new_venue(title, Decimal::new(100, 0), 4, "Krakow", &[]),
    )
    .await
}

/// Creates a confirmed booking for `user_id` over `[start, end)`.
pub async fn create_test_booking(
    db: &DatabaseConnection,
    user_id: i64,
    venue_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<entities::BookingModel> {
    booking::create_booking(db, user_id, venue_id, start, end).await
}

/// Sets up a complete test environment with a host and one venue.
/// Returns (db, host, venue) for common test scenarios.
pub async fn setup_with_venue() -> Result<(
    DatabaseConnection,
    entities::UserModel,
    entities::VenueModel,
)> {
    let db = setup_test_db().await?;
    let host = create_test_user(&db, "host@example.com").await?;
    let venue = create_test_venue(&db, host.id, "Test Venue").await?;
    Ok((db, host, venue))
}
