//! Core business logic - framework-agnostic booking, listing and account operations.
//!
//! Every function takes the persistence handle explicitly; nothing here knows
//! about HTTP.

/// Account deletion cascade
pub mod account;
/// Availability labels for listed venues
pub mod availability;
/// Booking lifecycle: create, change dates, cancel, list
pub mod booking;
/// Favourite venues of a user
pub mod favourite;
/// Overlap detection between booking ranges
pub mod overlap;
/// Night counting and price calculation
pub mod pricing;
/// User accounts
pub mod user;
/// Venue catalogue: creation, detail, listing
pub mod venue;
/// Venue listing query composition
pub mod venue_query;
