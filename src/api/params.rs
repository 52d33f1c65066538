//! Request parameter parsing shared by the handlers.

use crate::{
    core::venue_query::{SortDirection, SortKey, VenueListParams, VenueType},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|ts| ts.date_naive()))
        .map_err(|_| Error::InvalidDate {
            value: value.to_string(),
        })
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Validation {
        message: format!("{name} must be a number, got {value:?}"),
    })
}

/// Builds listing parameters from raw query pairs.
///
/// `features` may be repeated and each value may hold a comma-separated list.
/// Unknown `sortBy`, `sortDir` and `type` values are ignored; blank values count
/// as absent.
pub fn venue_list_params(
    pairs: &[(String, String)],
    current_user_id: Option<i64>,
) -> Result<VenueListParams> {
    let mut params = VenueListParams {
        current_user_id,
        ..Default::default()
    };

    for (key, value) in pairs {
        if value.trim().is_empty() {
            continue;
        }
        match key.as_str() {
            "city" => params.city = Some(value.clone()),
            "page" => params.page = Some(parse_number(key, value)?),
            "perPage" => params.per_page = Some(parse_number(key, value)?),
            "priceMin" => params.price_min = Some(parse_number::<Decimal>(key, value)?),
            "priceMax" => params.price_max = Some(parse_number::<Decimal>(key, value)?),
            "guests" => params.guests = Some(parse_number(key, value)?),
            "sortBy" => params.sort_by = SortKey::parse(value),
            "sortDir" => params.sort_dir = SortDirection::parse(value),
            "type" => params.venue_type = VenueType::parse(value),
            "startDate" => params.start_date = Some(parse_date(value)?),
            "endDate" => params.end_date = Some(parse_date(value)?),
            "features" => params.features.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string),
            ),
            _ => {}
        }
    }

    Ok(params)
}
