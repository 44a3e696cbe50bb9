use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use aerovia_core::booking::{Booking, PassengerInfo};
use aerovia_core::user::Role;

use crate::error::AppError;
use crate::middleware::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{reference}", get(get_booking))
        .route("/v1/bookings/{reference}/cancel", post(cancel_booking))
}

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    flight_id: Uuid,
    seats: i32,
    passenger_first_name: String,
    passenger_last_name: String,
    passenger_email: String,
    passenger_phone: String,
}

async fn create_booking(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    // Upsert keyed by email: first authenticated request creates the row,
    // later ones refresh the subject id.
    let user = state.users.sync_identity(&identity).await?;

    let passenger = PassengerInfo {
        first_name: req.passenger_first_name,
        last_name: req.passenger_last_name,
        email: req.passenger_email,
        phone: req.passenger_phone,
    };

    let booking = state
        .ledger
        .create_booking(req.flight_id, user.id, &passenger, req.seats)
        .await?;
    Ok(Json(booking))
}

async fn get_booking(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(reference): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.ledger.booking_by_reference(&reference).await?;
    authorize_owner(&state, &identity, &booking).await?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(reference): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    let booking = state.ledger.booking_by_reference(&reference).await?;
    authorize_owner(&state, &identity, &booking).await?;
    state.ledger.cancel_booking(&reference).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Bookings are visible to their owner and to admins.
async fn authorize_owner(
    state: &AppState,
    identity: &aerovia_core::identity::IdentityAssertion,
    booking: &Booking,
) -> Result<(), AppError> {
    if identity.role == Role::Admin {
        return Ok(());
    }
    let user = state.users.sync_identity(identity).await?;
    if user.id != booking.user_id {
        return Err(AppError::AuthorizationError(
            "booking belongs to another user".to_string(),
        ));
    }
    Ok(())
}
