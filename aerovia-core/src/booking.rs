use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

pub const MIN_SEATS_PER_BOOKING: i32 = 1;
pub const MAX_SEATS_PER_BOOKING: i32 = 9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_reference: String,
    pub flight_id: Uuid,
    pub user_id: Uuid,
    pub passenger_first_name: String,
    pub passenger_last_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub seats: i32,
    /// Flight price at booking time multiplied by seat count. Frozen at
    /// creation; later flight edits never alter historical bookings.
    pub total_price_amount: i64,
    pub price_currency: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Reserved for a future asynchronous confirmation flow; the current
    /// ledger never produces it.
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

/// Passenger contact details captured on a booking. Copied onto the
/// booking row so the record stays stable if the user profile changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl PassengerInfo {
    pub fn validate(&self) -> DomainResult<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(DomainError::validation("passenger name must not be empty"));
        }
        let email = self.email.trim();
        let at = email.find('@');
        let valid = matches!(at, Some(pos) if pos > 0 && email[pos + 1..].contains('.'));
        if !valid {
            return Err(DomainError::validation(format!(
                "malformed passenger email: {email}"
            )));
        }
        if self.phone.trim().is_empty() {
            return Err(DomainError::validation("passenger phone must not be empty"));
        }
        Ok(())
    }
}

/// Validates the per-booking seat range (1..=9).
pub fn validate_seat_count(seats: i32) -> DomainResult<()> {
    if !(MIN_SEATS_PER_BOOKING..=MAX_SEATS_PER_BOOKING).contains(&seats) {
        return Err(DomainError::validation(format!(
            "seat count must be between {MIN_SEATS_PER_BOOKING} and {MAX_SEATS_PER_BOOKING}, got {seats}"
        )));
    }
    Ok(())
}
