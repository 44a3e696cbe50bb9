use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: i32,
    pub available_seats: i32,
    pub price_amount: i64,
    pub price_currency: String,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Cancelled,
    Completed,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "SCHEDULED",
            FlightStatus::Delayed => "DELAYED",
            FlightStatus::Cancelled => "CANCELLED",
            FlightStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "SCHEDULED" => Ok(FlightStatus::Scheduled),
            "DELAYED" => Ok(FlightStatus::Delayed),
            "CANCELLED" => Ok(FlightStatus::Cancelled),
            "COMPLETED" => Ok(FlightStatus::Completed),
            other => Err(DomainError::validation(format!(
                "unknown flight status: {other}"
            ))),
        }
    }
}

/// Administrative payload for creating or replacing a flight. Seat
/// availability is never taken from this shape: creation seeds
/// `available_seats = total_seats`, and updates leave the live counter
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSpec {
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: i32,
    pub price_amount: i64,
    pub price_currency: String,
}

impl FlightSpec {
    pub fn validate(&self) -> DomainResult<()> {
        if self.flight_number.trim().is_empty() {
            return Err(DomainError::validation("flight number must not be empty"));
        }
        if self.airline.trim().is_empty() {
            return Err(DomainError::validation("airline must not be empty"));
        }
        for (field, code) in [("origin", &self.origin), ("destination", &self.destination)] {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(DomainError::validation(format!(
                    "{field} must be a 3-letter airport code, got '{code}'"
                )));
            }
        }
        if self.arrival_time <= self.departure_time {
            return Err(DomainError::validation(
                "arrival time must be after departure time",
            ));
        }
        if self.total_seats < 1 {
            return Err(DomainError::validation("total seats must be at least 1"));
        }
        if self.price_amount <= 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        Ok(())
    }
}

impl Flight {
    /// Builds a new flight from an administrative spec. All seats start
    /// available and the flight is scheduled.
    pub fn from_spec(spec: &FlightSpec) -> Flight {
        let now = Utc::now();
        Flight {
            id: Uuid::new_v4(),
            flight_number: spec.flight_number.to_uppercase(),
            airline: spec.airline.clone(),
            origin: spec.origin.to_uppercase(),
            destination: spec.destination.to_uppercase(),
            departure_time: spec.departure_time,
            arrival_time: spec.arrival_time,
            total_seats: spec.total_seats,
            available_seats: spec.total_seats,
            price_amount: spec.price_amount,
            price_currency: spec.price_currency.clone(),
            status: FlightStatus::Scheduled,
            created_at: now,
            updated_at: now,
        }
    }
}
