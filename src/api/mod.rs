//! HTTP API - a thin axum layer over the core operations.
//!
//! Handlers parse the request, call one core function and map its result. Caller
//! identity comes from the upstream authentication layer (see [`caller`]).

pub mod bookings;
pub mod caller;
pub mod error;
pub mod favourites;
pub mod params;
pub mod users;
pub mod venues;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Connection pool, created once at startup
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    /// Wraps a shared connection
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Builds the router with every route
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/me", get(bookings::list_my_bookings))
        .route(
            "/bookings/:id",
            patch(bookings::update_booking).delete(bookings::cancel_booking),
        )
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route("/venues/:id", get(venues::get_venue))
        .route("/favourites/me", get(favourites::list_favourites))
        .route("/favourites/me/ids", get(favourites::list_favourite_ids))
        .route(
            "/favourites/:venue_id",
            post(favourites::add_favourite).delete(favourites::remove_favourite),
        )
        .route("/users", delete(users::delete_me))
        .route("/users/me", get(users::get_me))
        .route("/users/update-phone", patch(users::update_phone))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{errors::Result, test_utils::*};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    /// Sends one request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body).
    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user_id: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user_id {
            builder = builder.header(caller::USER_ID_HEADER, id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_caller_header_required() -> Result<()> {
        let app = router(AppState::new(Arc::new(setup_test_db().await?)));

        let (status, body) = send(&app, "GET", "/bookings/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let request = Request::builder()
            .uri("/bookings/me")
            .header(caller::USER_ID_HEADER, "abc")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_booking_lifecycle() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let other = create_test_user(&db, "other@example.com").await?;
        let app = router(AppState::new(Arc::new(db)));

        let (status, created) = send(
            &app,
            "POST",
            "/bookings",
            Some(guest.id),
            Some(json!({
                "venueId": venue.id,
                "startDate": "2024-01-01",
                "endDate": "2024-01-04T12:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["totalPrice"], 300.0);
        assert_eq!(created["status"], "CONFIRMED");
        let booking_id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/bookings",
            Some(other.id),
            Some(json!({
                "venueId": venue.id,
                "startDate": "2024-01-03",
                "endDate": "2024-01-05",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("overlap"));

        let (status, body) = send(
            &app,
            "POST",
            "/bookings",
            Some(other.id),
            Some(json!({
                "venueId": venue.id,
                "startDate": "2024-02-04",
                "endDate": "2024-02-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, mine) = send(&app, "GET", "/bookings/me", Some(guest.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["venue"]["title"], "Test Venue");
        assert_eq!(mine[0]["venue"]["city"], "Krakow");

        let uri = format!("/bookings/{booking_id}");
        let (status, _) = send(
            &app,
            "PATCH",
            &uri,
            Some(other.id),
            Some(json!({ "startDate": "2024-01-01", "endDate": "2024-01-06" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = send(
            &app,
            "PATCH",
            &uri,
            Some(guest.id),
            Some(json!({ "startDate": "2024-01-01", "endDate": "2024-01-06" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["totalPrice"], 500.0);

        let (status, cancelled) = send(&app, "DELETE", &uri, Some(guest.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "CANCELLED");
        assert_eq!(cancelled["totalPrice"], 500.0);

        let (status, _) = send(&app, "DELETE", "/bookings/999", Some(guest.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_venue_routes() -> Result<()> {
        let db = setup_test_db().await?;
        let host = create_test_user(&db, "host@example.com").await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let app = router(AppState::new(Arc::new(db)));

        let (status, created) = send(
            &app,
            "POST",
            "/venues",
            Some(host.id),
            Some(json!({
                "title": "Garden House",
                "description": "Quiet",
                "pricePerNight": 80.5,
                "capacity": 5,
                "street": "Lipowa 3",
                "city": "Gdansk",
                "country": "PL",
                "features": ["Garden", "Wifi"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["pricePerNight"], 80.5);
        assert_eq!(created["features"], json!(["Garden", "Wifi"]));
        assert_eq!(created["address"]["city"], "Gdansk");
        let venue_id = created["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "POST",
            "/venues",
            Some(host.id),
            Some(json!({
                "title": "Studio",
                "description": "",
                "pricePerNight": 45,
                "capacity": 2,
                "street": "Dluga 1",
                "city": "Gdansk",
                "country": "PL",
                "features": ["Wifi"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, page) = send(
            &app,
            "GET",
            "/venues?features=wifi,garden&perPage=1000&startDate=2024-05-01&endDate=2024-05-03",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalCount"], 1);
        assert_eq!(page["items"][0]["id"], venue_id);
        assert_eq!(page["items"][0]["availabilityStatus"], "available");
        assert_eq!(page["items"][0]["isFavourite"], false);

        let (status, page) = send(&app, "GET", "/venues?sortBy=price", Some(guest.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalCount"], 2);
        assert_eq!(page["items"][0]["title"], "Studio");
        assert_eq!(page["items"][0]["availabilityStatus"], "unknown");

        let (status, _) = send(&app, "GET", "/venues?startDate=soon", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // An inverted window still lists venues, without availability
        let (status, page) = send(
            &app,
            "GET",
            "/venues?startDate=2024-05-03&endDate=2024-05-01",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalCount"], 2);
        assert_eq!(page["items"][0]["availabilityStatus"], "unknown");

        let (status, page) =
            send(&app, "GET", "/venues?page=9223372036854775807", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["totalCount"], 2);
        assert_eq!(page["items"], json!([]));

        let (status, body) = send(&app, "GET", "/venues/999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Venue 999 not found");

        let (status, _) = send(
            &app,
            "POST",
            "/venues",
            Some(host.id),
            Some(json!({
                "title": "Broken",
                "description": "",
                "pricePerNight": 10,
                "capacity": 0,
                "street": "x",
                "city": "y",
                "country": "z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_favourite_routes() -> Result<()> {
        let (db, _host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        let app = router(AppState::new(Arc::new(db)));
        let uri = format!("/favourites/{}", venue.id);

        let (status, _) = send(&app, "POST", &uri, Some(guest.id), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, "POST", &uri, Some(guest.id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, ids) = send(&app, "GET", "/favourites/me/ids", Some(guest.id), None).await;
        assert_eq!(ids, json!([venue.id]));

        let (_, favourites) = send(&app, "GET", "/favourites/me", Some(guest.id), None).await;
        assert_eq!(favourites[0]["title"], "Test Venue");
        assert_eq!(favourites[0]["pricePerNight"], 100.0);

        let (_, page) = send(&app, "GET", "/venues", Some(guest.id), None).await;
        assert_eq!(page["items"][0]["isFavourite"], true);

        let (status, body) = send(&app, "DELETE", &uri, Some(guest.id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        let (status, _) = send(&app, "DELETE", &uri, Some(guest.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "POST", "/favourites/999", Some(guest.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_routes() -> Result<()> {
        let (db, host, venue) = setup_with_venue().await?;
        let guest = create_test_user(&db, "guest@example.com").await?;
        create_test_booking(&db, guest.id, venue.id, date(2024, 1, 1), date(2024, 1, 3)).await?;
        let db = Arc::new(db);
        let app = router(AppState::new(Arc::clone(&db)));

        let (status, updated) = send(
            &app,
            "PATCH",
            "/users/update-phone",
            Some(host.id),
            Some(json!({ "phoneNumber": "+48 600 000 000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["phoneNumber"], "+48 600 000 000");
        assert!(updated.get("passwordHash").is_none());

        let (status, _) = send(
            &app,
            "PATCH",
            "/users/update-phone",
            Some(host.id),
            Some(json!({ "phoneNumber": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "DELETE", "/users", Some(host.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deleted": true }));

        let (status, _) = send(&app, "GET", "/users/me", Some(host.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", "/users", Some(host.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // The guest's booking went with the venue
        let (_, mine) = send(&app, "GET", "/bookings/me", Some(guest.id), None).await;
        assert_eq!(mine, json!([]));

        let (status, me) = send(&app, "GET", "/users/me", Some(guest.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "guest@example.com");
        assert_eq!(me["address"], Value::Null);

        let venues = crate::core::venue::list_venues(&db, &Default::default()).await?;
        assert_eq!(venues.total_count, 0);
        Ok(())
    }
}
