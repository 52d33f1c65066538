//! Unified error types and result handling.
//!
//! Domain checks (ownership, date validity, overlap) raise their own variants at
//! the point of detection. Storage errors are inspected once, in the `From<DbErr>`
//! conversion, so that unique and foreign-key violations surface as domain kinds.

use chrono::NaiveDate;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A date range whose end is not after its start
    #[error("endDate ({end}) must be after startDate ({start})")]
    InvalidDateRange {
        /// Requested first night
        start: NaiveDate,
        /// Requested checkout day
        end: NaiveDate,
    },

    /// A date string that could not be parsed
    #[error("Invalid date: {value}")]
    InvalidDate {
        /// The rejected input
        value: String,
    },

    /// Any other rejected input
    #[error("Invalid input: {message}")]
    Validation {
        /// Why the input was rejected
        message: String,
    },

    /// The requested nights collide with a confirmed booking
    #[error("Dates overlap an existing booking for venue {venue_id}")]
    BookingOverlap {
        /// Venue that is already booked
        venue_id: i64,
    },

    /// A stored booking whose own range yields no nights
    #[error("Booking {booking_id} has a corrupted stored duration ({nights} nights)")]
    CorruptedBooking {
        /// Offending booking
        booking_id: i64,
        /// Night count derived from the stored range
        nights: i64,
    },

    /// A referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. `"Venue"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The caller does not own the resource it tries to mutate
    #[error("User {user_id} may not modify {entity} {id}")]
    Forbidden {
        /// Entity name, e.g. `"Booking"`
        entity: &'static str,
        /// Identifier of the resource
        id: i64,
        /// The caller
        user_id: i64,
    },

    /// A unique key already exists
    #[error("Unique constraint violated: {message}")]
    UniqueConstraint {
        /// Storage-layer detail
        message: String,
    },

    /// A foreign key blocked a write
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        /// Storage-layer detail
        message: String,
    },

    /// Any other storage-layer failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::UniqueConstraint { message },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                Self::ForeignKeyViolation { message }
            }
            _ => Self::Database(err),
        }
    }
}

/// Coarse classification used by the transport to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity is absent
    NotFound,
    /// Caller does not own the resource
    Forbidden,
    /// Malformed input, overlapping dates, corrupted stored duration
    BadRequest,
    /// Duplicate unique key
    Conflict,
    /// Cascade-ordering bug, reported separately for operators
    ForeignKeyViolation,
    /// Everything else
    Internal,
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by an integer id
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Maps the variant onto the error taxonomy
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidDateRange { .. }
            | Self::InvalidDate { .. }
            | Self::Validation { .. }
            | Self::BookingOverlap { .. }
            | Self::CorruptedBooking { .. } => ErrorKind::BadRequest,
            Self::UniqueConstraint { .. } => ErrorKind::Conflict,
            Self::ForeignKeyViolation { .. } => ErrorKind::ForeignKeyViolation,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
