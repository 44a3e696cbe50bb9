use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use aerovia_api::{app, middleware::Claims, AppState, AuthConfig};
use aerovia_cache::{Cache, CacheTtls, MemoryCache};
use aerovia_core::flight::{Flight, FlightSpec};
use aerovia_core::repository::FlightStore;
use aerovia_ledger::{BookingLedger, FlightService, UserService};
use aerovia_store::{MemoryBookingStore, MemoryFlightStore, MemoryUserStore};

const SECRET: &str = "test-secret";

fn test_state() -> (AppState, Arc<MemoryFlightStore>) {
    let flight_store = Arc::new(MemoryFlightStore::new());
    let booking_store = Arc::new(MemoryBookingStore::new());
    let user_store = Arc::new(MemoryUserStore::new());
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let ttls = CacheTtls::default();

    let flights = Arc::new(FlightService::new(
        flight_store.clone(),
        cache.clone(),
        ttls.clone(),
    ));
    let ledger = Arc::new(BookingLedger::new(
        flights.clone(),
        booking_store,
        user_store.clone(),
        cache,
        ttls,
    ));
    let users = Arc::new(UserService::new(user_store));

    let state = AppState {
        flights,
        ledger,
        users,
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    };
    (state, flight_store)
}

fn bearer(email: &str, role: &str) -> String {
    let claims = Claims {
        sub: format!("auth0|{email}"),
        email: email.to_string(),
        given_name: Some("Thu".to_string()),
        family_name: Some("Le".to_string()),
        role: Some(role.to_string()),
        exp: 4_102_444_800, // 2100-01-01
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

fn seed_flight(store: &MemoryFlightStore, number: &str, available: i32, price: i64) -> Flight {
    let dep = Utc::now() + Duration::days(5);
    let mut flight = Flight::from_spec(&FlightSpec {
        flight_number: number.to_string(),
        airline: "Aerovia".to_string(),
        origin: "SGN".to_string(),
        destination: "HAN".to_string(),
        departure_time: dep,
        arrival_time: dep + Duration::hours(2),
        total_seats: 200,
        price_amount: price,
        price_currency: "USD".to_string(),
    });
    flight.available_seats = available;
    store.seed(flight.clone());
    flight
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let (state, _) = test_state();

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/v1/flights/search?origin=SGN&destination=HAN&departing_after=2030-01-01T00:00:00Z&seats=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_flight_admin_crud_requires_admin_role() {
    let (state, _) = test_state();
    let router = app(state);

    let dep = Utc::now() + Duration::days(5);
    let payload = json!({
        "flight_number": "AV900",
        "airline": "Aerovia",
        "origin": "SGN",
        "destination": "DAD",
        "departure_time": dep,
        "arrival_time": dep + Duration::hours(1),
        "total_seats": 120,
        "price_amount": 45_00,
        "price_currency": "USD",
    });

    let forbidden = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/flights")
                .header("authorization", bearer("pax@example.com", "USER"))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let created = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/flights")
                .header("authorization", bearer("ops@example.com", "ADMIN"))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);

    let flight = body_json(created).await;
    assert_eq!(flight["flight_number"], "AV900");
    assert_eq!(flight["available_seats"], 120);
    assert_eq!(flight["status"], "SCHEDULED");
}

#[tokio::test]
async fn test_booking_happy_path_and_double_cancel() {
    let (state, flight_store) = test_state();
    let flight = seed_flight(&flight_store, "AV100", 150, 99_00);
    let router = app(state);
    let auth = bearer("pax@example.com", "USER");

    let payload = json!({
        "flight_id": flight.id,
        "seats": 2,
        "passenger_first_name": "Thu",
        "passenger_last_name": "Le",
        "passenger_email": "thu.le@example.com",
        "passenger_phone": "+84911222333",
    });

    let created = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/bookings")
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    let booking = body_json(created).await;
    let reference = booking["booking_reference"].as_str().unwrap().to_string();
    assert_eq!(booking["status"], "CONFIRMED");
    assert_eq!(booking["total_price_amount"], 2 * 99_00);

    let after = flight_store.get_flight(flight.id).await.unwrap();
    assert_eq!(after.available_seats, 148);

    let listed = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/users/me/bookings")
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body_json(listed).await.as_array().unwrap().len(), 1);

    let cancelled = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/bookings/{reference}/cancel"))
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        flight_store.get_flight(flight.id).await.unwrap().available_seats,
        150
    );

    let again = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/bookings/{reference}/cancel"))
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_unknown_flight_is_404_and_bad_seats_400() {
    let (state, _) = test_state();
    let router = app(state);
    let auth = bearer("pax@example.com", "USER");

    let missing = json!({
        "flight_id": uuid::Uuid::new_v4(),
        "seats": 1,
        "passenger_first_name": "Thu",
        "passenger_last_name": "Le",
        "passenger_email": "thu.le@example.com",
        "passenger_phone": "+84911222333",
    });
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/bookings")
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(missing.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut bad_seats = missing.clone();
    bad_seats["seats"] = json!(0);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/bookings")
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(bad_seats.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_is_hidden_from_other_users() {
    let (state, flight_store) = test_state();
    let flight = seed_flight(&flight_store, "AV101", 50, 60_00);
    let router = app(state);

    let payload = json!({
        "flight_id": flight.id,
        "seats": 1,
        "passenger_first_name": "Thu",
        "passenger_last_name": "Le",
        "passenger_email": "thu.le@example.com",
        "passenger_phone": "+84911222333",
    });
    let created = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/bookings")
                .header("authorization", bearer("owner@example.com", "USER"))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let reference = body_json(created).await["booking_reference"]
        .as_str()
        .unwrap()
        .to_string();

    let other = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/v1/bookings/{reference}"))
                .header("authorization", bearer("stranger@example.com", "USER"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let admin = router
        .oneshot(
            Request::builder()
                .uri(format!("/v1/bookings/{reference}"))
                .header("authorization", bearer("ops@example.com", "ADMIN"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_upserts_and_returns_profile() {
    let (state, _) = test_state();
    let router = app(state);

    let me = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/users/me")
                .header("authorization", bearer("thu.le@example.com", "USER"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let profile = body_json(me).await;
    assert_eq!(profile["email"], "thu.le@example.com");
    assert_eq!(profile["role"], "USER");
    assert_eq!(profile["active"], true);

    // Same email again: same row, not a duplicate.
    let again = router
        .oneshot(
            Request::builder()
                .uri("/v1/users/me")
                .header("authorization", bearer("thu.le@example.com", "USER"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let second = body_json(again).await;
    assert_eq!(profile["id"], second["id"]);
}
