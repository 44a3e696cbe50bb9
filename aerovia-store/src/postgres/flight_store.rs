use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use aerovia_core::error::{DomainError, DomainResult};
use aerovia_core::flight::{Flight, FlightSpec, FlightStatus};
use aerovia_core::repository::FlightStore;
use aerovia_core::search::SearchQuery;

use super::{map_sqlx, unique_violation};

pub struct PostgresFlightStore {
    pool: PgPool,
}

impl PostgresFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    airline: String,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    total_seats: i32,
    available_seats: i32,
    price_amount: i64,
    price_currency: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FlightRow {
    fn into_flight(self) -> DomainResult<Flight> {
        Ok(Flight {
            id: self.id,
            flight_number: self.flight_number,
            airline: self.airline,
            origin: self.origin,
            destination: self.destination,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            total_seats: self.total_seats,
            available_seats: self.available_seats,
            price_amount: self.price_amount,
            price_currency: self.price_currency,
            status: FlightStatus::parse(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const FLIGHT_COLUMNS: &str = "id, flight_number, airline, origin, destination, \
     departure_time, arrival_time, total_seats, available_seats, \
     price_amount, price_currency, status, created_at, updated_at";

#[async_trait]
impl FlightStore for PostgresFlightStore {
    async fn get_flight(&self, id: Uuid) -> DomainResult<Flight> {
        let row: Option<FlightRow> =
            sqlx::query_as(&format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;

        row.ok_or_else(|| DomainError::not_found("Flight", id))?
            .into_flight()
    }

    async fn get_flight_by_number(&self, flight_number: &str) -> DomainResult<Flight> {
        let row: Option<FlightRow> = sqlx::query_as(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE flight_number = $1"
        ))
        .bind(flight_number.to_uppercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.ok_or_else(|| DomainError::not_found("Flight", flight_number))?
            .into_flight()
    }

    async fn search_available(&self, query: &SearchQuery) -> DomainResult<Vec<Flight>> {
        let query = query.normalized();
        let rows: Vec<FlightRow> = sqlx::query_as(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE origin = $1 AND destination = $2 \
               AND departure_time >= $3 AND available_seats >= $4 \
               AND status = 'SCHEDULED' \
             ORDER BY departure_time, id"
        ))
        .bind(&query.origin)
        .bind(&query.destination)
        .bind(query.departing_after)
        .bind(query.seats_needed)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter().map(FlightRow::into_flight).collect()
    }

    async fn try_decrease_seats(&self, flight_id: Uuid, seats: i32) -> DomainResult<bool> {
        // Conditional update: the WHERE clause makes check-and-decrement
        // a single atomic statement, so concurrent bookings for the last
        // seats cannot both succeed.
        let result = sqlx::query(
            "UPDATE flights \
             SET available_seats = available_seats - $2, updated_at = NOW() \
             WHERE id = $1 AND available_seats >= $2",
        )
        .bind(flight_id)
        .bind(seats)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(result.rows_affected() == 1)
    }

    async fn increase_seats(&self, flight_id: Uuid, seats: i32) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE flights \
             SET available_seats = LEAST(available_seats + $2, total_seats), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(flight_id)
        .bind(seats)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            warn!(%flight_id, seats, "seat release against missing flight");
            return Err(DomainError::not_found("Flight", flight_id));
        }
        Ok(())
    }

    async fn create_flight(&self, flight: &Flight) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO flights \
             (id, flight_number, airline, origin, destination, departure_time, \
              arrival_time, total_seats, available_seats, price_amount, \
              price_currency, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.airline)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .bind(flight.total_seats)
        .bind(flight.available_seats)
        .bind(flight.price_amount)
        .bind(&flight.price_currency)
        .bind(flight.status.as_str())
        .bind(flight.created_at)
        .bind(flight.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if unique_violation(&err).is_some() {
                DomainError::conflict(format!(
                    "flight number {} already exists",
                    flight.flight_number
                ))
            } else {
                map_sqlx(err)
            }
        })?;
        Ok(())
    }

    async fn update_flight(&self, id: Uuid, spec: &FlightSpec) -> DomainResult<Flight> {
        // A capacity change moves available_seats by the same delta, so
        // available + sold == total holds afterwards. The WHERE clause
        // refuses to shrink below the sold count in the same atomic
        // statement that applies the update.
        let row: Option<FlightRow> = sqlx::query_as(&format!(
            "UPDATE flights \
             SET airline = $2, origin = $3, destination = $4, \
                 departure_time = $5, arrival_time = $6, \
                 available_seats = available_seats + ($7 - total_seats), \
                 total_seats = $7, \
                 price_amount = $8, price_currency = $9, updated_at = NOW() \
             WHERE id = $1 AND $7 >= total_seats - available_seats \
             RETURNING {FLIGHT_COLUMNS}"
        ))
        .bind(id)
        .bind(&spec.airline)
        .bind(spec.origin.to_uppercase())
        .bind(spec.destination.to_uppercase())
        .bind(spec.departure_time)
        .bind(spec.arrival_time)
        .bind(spec.total_seats)
        .bind(spec.price_amount)
        .bind(&spec.price_currency)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => row.into_flight(),
            None => {
                let exists: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM flights WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(map_sqlx)?;
                match exists {
                    Some(_) => Err(DomainError::conflict(format!(
                        "total_seats {} is below the seats already sold",
                        spec.total_seats
                    ))),
                    None => Err(DomainError::not_found("Flight", id)),
                }
            }
        }
    }

    async fn delete_flight(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Flight", id));
        }
        Ok(())
    }
}
