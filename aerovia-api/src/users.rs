use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use aerovia_core::booking::Booking;
use aerovia_core::user::User;

use crate::error::AppError;
use crate::middleware::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users/me", get(me))
        .route("/v1/users/me/bookings", get(my_bookings))
}

async fn me(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<Json<User>, AppError> {
    let user = state.users.sync_identity(&identity).await?;
    Ok(Json(user))
}

async fn my_bookings(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user = state.users.sync_identity(&identity).await?;
    let bookings = state.ledger.bookings_for_user(user.id).await?;
    Ok(Json(bookings))
}
