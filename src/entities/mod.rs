//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod booking;
pub mod favourite;
pub mod feature;
pub mod user;
pub mod user_address;
pub mod venue;
pub mod venue_address;
pub mod venue_feature;

// Re-export specific types to avoid conflicts
pub use booking::{
    BookingStatus, Column as BookingColumn, Entity as Booking, Model as BookingModel,
};
pub use favourite::{Column as FavouriteColumn, Entity as Favourite, Model as FavouriteModel};
pub use feature::{Column as FeatureColumn, Entity as Feature, Model as FeatureModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_address::{
    Column as UserAddressColumn, Entity as UserAddress, Model as UserAddressModel,
};
pub use venue::{Column as VenueColumn, Entity as Venue, Model as VenueModel};
pub use venue_address::{
    Column as VenueAddressColumn, Entity as VenueAddress, Model as VenueAddressModel,
};
pub use venue_feature::{
    Column as VenueFeatureColumn, Entity as VenueFeature, Model as VenueFeatureModel,
};
