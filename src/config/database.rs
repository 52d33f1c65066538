//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so foreign keys and unique constraints follow
//! the `belongs_to` relations and column attributes declared on the models.

use crate::entities::{
    Booking, Favourite, Feature, User, UserAddress, Venue, VenueAddress, VenueFeature,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default `SQLite` location, created on first use
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/venue_booking.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to `configured` and finally to [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(ToString::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
///
/// The returned handle is cheap to clone and is passed explicitly to every
/// operation; it is closed when the server shuts down.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    ensure_sqlite_dir(database_url)?;
    Database::connect(database_url).await.map_err(Into::into)
}

// SQLite creates the file on demand but not its directory.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Referenced tables are created before the tables pointing at them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, UserAddress).await?;
    create_table(db, &schema, User).await?;
    create_table(db, &schema, VenueAddress).await?;
    create_table(db, &schema, Venue).await?;
    create_table(db, &schema, Feature).await?;
    create_table(db, &schema, VenueFeature).await?;
    create_table(db, &schema, Booking).await?;
    create_table(db, &schema, Favourite).await?;

    info!("Database tables ensured.");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
