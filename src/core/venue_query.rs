//! Venue listing query composition.
//!
//! Turns a bag of optional listing parameters into a [`VenueQueryPlan`]:
//! a conjunctive filter, a sort order, an optional availability window and the
//! page to fetch. Each filter rule is its own function returning an optional
//! fragment; the plan is the AND of every fragment that is present.
//!
//! Nothing here touches the database; [`crate::core::venue::list_venues`] executes
//! the plan.

use crate::{
    core::overlap,
    entities::{
        Feature, Venue, VenueAddress, VenueFeature, feature, venue, venue_address, venue_feature,
    },
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sea_orm::{
    Condition, Order, QueryOrder, Select,
    prelude::*,
    sea_query::{Expr, LikeExpr, Query},
};

/// Page size used when the caller does not ask for one
pub const DEFAULT_PER_PAGE: u64 = 12;
/// Largest page size a caller can ask for
pub const MAX_PER_PAGE: u64 = 60;
/// Largest offset the database driver accepts
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Preset capacity brackets selectable by venue type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueType {
    /// Up to 2 guests
    Studio,
    /// Up to 3 guests
    Apartment,
    /// 4 to 8 guests
    House,
    /// 9 guests or more
    Villa,
}

impl VenueType {
    /// Parses a type tag; unknown tags yield `None`
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "studio" => Some(Self::Studio),
            "apartment" => Some(Self::Apartment),
            "house" => Some(Self::House),
            "villa" => Some(Self::Villa),
            _ => None,
        }
    }

    /// Inclusive `(min, max)` capacity; `None` means unbounded
    #[must_use]
    pub const fn capacity_bracket(self) -> (Option<i32>, Option<i32>) {
        match self {
            Self::Studio => (None, Some(2)),
            Self::Apartment => (None, Some(3)),
            Self::House => (Some(4), Some(8)),
            Self::Villa => (Some(9), None),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// Parses `asc`/`desc`; anything else yields `None`
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Recognized sort keys, each with a fixed column and default direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Nightly price, ascending by default
    Price,
    /// Rating, descending by default
    Rating,
    /// Capacity, descending by default
    Capacity,
    /// Title, ascending by default
    Title,
    /// Creation time, descending by default
    CreatedAt,
}

impl SortKey {
    /// Parses a sort key; unknown keys yield `None` and fall back to the default order
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "price" => Some(Self::Price),
            "rating" => Some(Self::Rating),
            "capacity" => Some(Self::Capacity),
            "title" => Some(Self::Title),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    /// Column the key sorts on
    #[must_use]
    pub const fn column(self) -> venue::Column {
        match self {
            Self::Price => venue::Column::PricePerNightCents,
            Self::Rating => venue::Column::Rating,
            Self::Capacity => venue::Column::Capacity,
            Self::Title => venue::Column::Title,
            Self::CreatedAt => venue::Column::CreatedAt,
        }
    }

    /// Direction used when the caller gives none
    #[must_use]
    pub const fn default_direction(self) -> SortDirection {
        match self {
            Self::Price | Self::Title => SortDirection::Asc,
            Self::Rating | Self::Capacity | Self::CreatedAt => SortDirection::Desc,
        }
    }
}

/// Listing parameters after transport-level parsing
#[derive(Debug, Clone, Default)]
pub struct VenueListParams {
    /// Case-insensitive substring of the address city
    pub city: Option<String>,
    /// Inclusive lower bound on the nightly price
    pub price_min: Option<Decimal>,
    /// Inclusive upper bound on the nightly price
    pub price_max: Option<Decimal>,
    /// Every listed feature must be attached to the venue
    pub features: Vec<String>,
    /// Capacity preset, ignored when `guests` is positive
    pub venue_type: Option<VenueType>,
    /// Minimum capacity
    pub guests: Option<i64>,
    /// Sort key; `None` sorts newest first
    pub sort_by: Option<SortKey>,
    /// Overrides the key's default direction
    pub sort_dir: Option<SortDirection>,
    /// First night of the stay to check availability for
    pub start_date: Option<NaiveDate>,
    /// Checkout day of the stay to check availability for
    pub end_date: Option<NaiveDate>,
    /// Caller, for favourite and `booked_by_me` flags
    pub current_user_id: Option<i64>,
    /// 1-based page number
    pub page: Option<i64>,
    /// Requested page size
    pub per_page: Option<i64>,
}

/// A normalized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number, at least 1
    pub page: u64,
    /// Page size within `[1, MAX_PER_PAGE]`
    pub per_page: u64,
}

impl Pagination {
    /// Clamps a raw page request
    #[must_use]
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1).unsigned_abs();
        #[allow(clippy::cast_possible_wrap)]
        let per_page = per_page.map_or(DEFAULT_PER_PAGE, |size| {
            size.clamp(1, MAX_PER_PAGE as i64).unsigned_abs()
        });
        Self { page, per_page }
    }

    /// Number of rows to skip, at most [`MAX_OFFSET`]
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = (self.page - 1).saturating_mul(self.per_page);
        if offset > MAX_OFFSET {
            MAX_OFFSET
        } else {
            offset
        }
    }
}

/// The stay whose overlap with existing bookings is reported per venue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    /// First night
    pub start: NaiveDate,
    /// Checkout day
    pub end: NaiveDate,
}

impl AvailabilityWindow {
    /// Confirmed bookings intersecting the window
    #[must_use]
    pub fn bookings_condition(&self) -> Condition {
        overlap::overlap_condition(self.start, self.end)
    }
}

/// Everything needed to run a listing query
#[derive(Debug, Clone)]
pub struct VenueQueryPlan {
    /// Conjunction of all supplied filters; shared by count and page fetch
    pub filter: Condition,
    /// Primary order followed by the id tie-break
    pub order: Vec<(venue::Column, Order)>,
    /// Present only when both dates were given in order
    pub availability: Option<AvailabilityWindow>,
    /// Caller for favourite and ownership flags
    pub current_user_id: Option<i64>,
    /// Page to fetch
    pub pagination: Pagination,
}

impl VenueQueryPlan {
    /// Filtered, ordered venue query without paging
    #[must_use]
    pub fn select(&self) -> Select<Venue> {
        self.order.iter().fold(
            Venue::find().filter(self.filter.clone()),
            |query, (column, order)| query.order_by(*column, order.clone()),
        )
    }

    /// Filtered venue query for counting
    #[must_use]
    pub fn count_select(&self) -> Select<Venue> {
        Venue::find().filter(self.filter.clone())
    }
}

/// Builds the query plan for `params`.
#[must_use]
pub fn compose(params: &VenueListParams) -> VenueQueryPlan {
    let plan = VenueQueryPlan {
        filter: filter_condition(params),
        order: sort_order(params.sort_by, params.sort_dir),
        availability: availability_window(params.start_date, params.end_date),
        current_user_id: params.current_user_id,
        pagination: Pagination::new(params.page, params.per_page),
    };
    tracing::debug!(?plan.pagination, ?plan.availability, "Composed venue query");
    plan
}

/// AND of every filter fragment that applies to `params`.
#[must_use]
pub fn filter_condition(params: &VenueListParams) -> Condition {
    [
        city_filter(params.city.as_deref()),
        price_filter(params.price_min, params.price_max),
        feature_filter(&params.features),
        capacity_filter(params.guests, params.venue_type),
    ]
    .into_iter()
    .flatten()
    .fold(Condition::all(), Condition::add)
}

/// Case folding shared by stored search keys and filter input, so matching
/// is case-insensitive beyond ASCII.
#[must_use]
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Address city contains `city`, ignoring case. Blank input applies no filter.
#[must_use]
pub fn city_filter(city: Option<&str>) -> Option<Condition> {
    let city = city.map(str::trim).filter(|c| !c.is_empty())?;
    let pattern = format!("%{}%", escape_like(&fold_case(city)));

    let matching_addresses = Query::select()
        .column((VenueAddress, venue_address::Column::Id))
        .from(VenueAddress)
        .and_where(
            Expr::col((VenueAddress, venue_address::Column::CityKey))
                .like(LikeExpr::new(pattern).escape('\\')),
        )
        .to_owned();

    Some(Condition::all().add(venue::Column::AddressId.in_subquery(matching_addresses)))
}

/// Inclusive nightly price bounds, each optional.
#[must_use]
pub fn price_filter(price_min: Option<Decimal>, price_max: Option<Decimal>) -> Option<Condition> {
    if price_min.is_none() && price_max.is_none() {
        return None;
    }
    let mut condition = Condition::all();
    if let Some(min) = price_min {
        let min_cents = cents_bound(min, Decimal::ceil);
        condition = condition.add(venue::Column::PricePerNightCents.gte(min_cents));
    }
    if let Some(max) = price_max {
        let max_cents = cents_bound(max, Decimal::floor);
        condition = condition.add(venue::Column::PricePerNightCents.lte(max_cents));
    }
    Some(condition)
}

// Prices are stored in cents; a fractional-cent bound is rounded outward by the
// caller and out-of-range bounds saturate.
fn cents_bound(amount: Decimal, round: fn(&Decimal) -> Decimal) -> i64 {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| round(&cents))
        .and_then(|cents| cents.to_i64())
        .unwrap_or(if amount.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}

/// One sub-condition per requested feature name, matched case-insensitively;
/// a venue must carry all of them.
#[must_use]
pub fn feature_filter(features: &[String]) -> Option<Condition> {
    let mut names: Vec<String> = features
        .iter()
        .map(|name| fold_case(name.trim()))
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    if names.is_empty() {
        return None;
    }

    Some(names.into_iter().fold(Condition::all(), |condition, name| {
        let venues_with_feature = Query::select()
            .column((VenueFeature, venue_feature::Column::VenueId))
            .from(VenueFeature)
            .inner_join(
                Feature,
                Expr::col((Feature, feature::Column::Id))
                    .equals((VenueFeature, venue_feature::Column::FeatureId)),
            )
            .and_where(Expr::col((Feature, feature::Column::NameKey)).eq(name))
            .to_owned();
        condition.add(venue::Column::Id.in_subquery(venues_with_feature))
    }))
}

/// Minimum capacity from a positive `guests`, else the bracket of `venue_type`.
#[must_use]
pub fn capacity_filter(guests: Option<i64>, venue_type: Option<VenueType>) -> Option<Condition> {
    if let Some(guests) = guests.filter(|g| *g > 0) {
        return Some(Condition::all().add(venue::Column::Capacity.gte(guests)));
    }

    let (min, max) = venue_type?.capacity_bracket();
    let mut condition = Condition::all();
    if let Some(min) = min {
        condition = condition.add(venue::Column::Capacity.gte(min));
    }
    if let Some(max) = max {
        condition = condition.add(venue::Column::Capacity.lte(max));
    }
    Some(condition)
}

/// Order for the listing: the key's column in the requested or default
/// direction, then venue id in the same direction. Without a key, newest first.
#[must_use]
pub fn sort_order(
    sort_by: Option<SortKey>,
    sort_dir: Option<SortDirection>,
) -> Vec<(venue::Column, Order)> {
    let (column, direction) = match sort_by {
        Some(key) => (key.column(), sort_dir.unwrap_or_else(|| key.default_direction())),
        None => (venue::Column::CreatedAt, SortDirection::Desc),
    };
    vec![
        (column, direction.order()),
        (venue::Column::Id, direction.order()),
    ]
}

/// Availability window when both dates are present and `start < end`.
///
/// An empty or inverted range yields no window; the listing is still served,
/// just without availability.
#[must_use]
pub fn availability_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<AvailabilityWindow> {
    match (start, end) {
        (Some(start), Some(end)) if start < end => Some(AvailabilityWindow { start, end }),
        (Some(start), Some(end)) => {
            tracing::debug!(%start, %end, "Ignoring empty availability window");
            None
        }
        _ => None,
    }
}
