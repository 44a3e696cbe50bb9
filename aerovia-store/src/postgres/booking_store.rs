use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aerovia_core::booking::{Booking, BookingStatus};
use aerovia_core::error::{DomainError, DomainResult};
use aerovia_core::repository::BookingStore;

use super::{map_sqlx, unique_violation};

pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_reference: String,
    flight_id: Uuid,
    user_id: Uuid,
    passenger_first_name: String,
    passenger_last_name: String,
    passenger_email: String,
    passenger_phone: String,
    seats: i32,
    total_price_amount: i64,
    price_currency: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> DomainResult<Booking> {
        Ok(Booking {
            id: self.id,
            booking_reference: self.booking_reference,
            flight_id: self.flight_id,
            user_id: self.user_id,
            passenger_first_name: self.passenger_first_name,
            passenger_last_name: self.passenger_last_name,
            passenger_email: self.passenger_email,
            passenger_phone: self.passenger_phone,
            seats: self.seats,
            total_price_amount: self.total_price_amount,
            price_currency: self.price_currency,
            status: BookingStatus::parse(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, booking_reference, flight_id, user_id, \
     passenger_first_name, passenger_last_name, passenger_email, \
     passenger_phone, seats, total_price_amount, price_currency, status, \
     created_at, updated_at";

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn insert_booking(&self, booking: &Booking) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO bookings \
             (id, booking_reference, flight_id, user_id, passenger_first_name, \
              passenger_last_name, passenger_email, passenger_phone, seats, \
              total_price_amount, price_currency, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(booking.id)
        .bind(&booking.booking_reference)
        .bind(booking.flight_id)
        .bind(booking.user_id)
        .bind(&booking.passenger_first_name)
        .bind(&booking.passenger_last_name)
        .bind(&booking.passenger_email)
        .bind(&booking.passenger_phone)
        .bind(booking.seats)
        .bind(booking.total_price_amount)
        .bind(&booking.price_currency)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match unique_violation(&err) {
            Some(constraint) if constraint.contains("booking_reference") => {
                DomainError::DuplicateReference(booking.booking_reference.clone())
            }
            Some(_) => DomainError::conflict("booking already exists"),
            None => map_sqlx(err),
        })?;
        Ok(())
    }

    async fn get_by_reference(&self, reference: &str) -> DomainResult<Booking> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.ok_or_else(|| DomainError::not_found("Booking", reference))?
            .into_booking()
    }

    async fn list_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE user_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn try_cancel(&self, id: Uuid) -> DomainResult<bool> {
        // Conditional update: only one of several concurrent
        // cancellations flips the row, so seats are released once.
        let result = sqlx::query(
            "UPDATE bookings SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status <> $2",
        )
        .bind(id)
        .bind(BookingStatus::Cancelled.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Booking", id));
        }
        Ok(())
    }
}
