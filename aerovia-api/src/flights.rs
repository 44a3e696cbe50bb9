use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use aerovia_core::flight::{Flight, FlightSpec};
use aerovia_core::search::SearchQuery;

use crate::error::AppError;
use crate::middleware::auth::AdminIdentity;
use crate::middleware::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights/search", get(search_flights))
        .route("/v1/flights", post(create_flight))
        .route("/v1/flights/{id}", get(get_flight))
        .route("/v1/flights/{id}", put(update_flight).delete(delete_flight))
        .route("/v1/flights/number/{flight_number}", get(get_flight_by_number))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    origin: String,
    destination: String,
    departing_after: DateTime<Utc>,
    seats: i32,
}

async fn search_flights(
    State(state): State<AppState>,
    Identity(_identity): Identity,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let query = SearchQuery {
        origin: params.origin,
        destination: params.destination,
        departing_after: params.departing_after,
        seats_needed: params.seats,
    };
    let flights = state.flights.search(&query).await?;
    Ok(Json(flights))
}

async fn get_flight(
    State(state): State<AppState>,
    Identity(_identity): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.flights.get_flight(id).await?;
    Ok(Json(flight))
}

async fn get_flight_by_number(
    State(state): State<AppState>,
    Identity(_identity): Identity,
    Path(flight_number): Path<String>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.flights.get_flight_by_number(&flight_number).await?;
    Ok(Json(flight))
}

async fn create_flight(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Json(spec): Json<FlightSpec>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.flights.create_flight(&spec).await?;
    Ok(Json(flight))
}

async fn update_flight(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<Uuid>,
    Json(spec): Json<FlightSpec>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.flights.update_flight(id, &spec).await?;
    Ok(Json(flight))
}

async fn delete_flight(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    state.flights.delete_flight(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
