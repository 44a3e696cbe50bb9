use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use aerovia_cache::{get_json, keys, set_json, Cache, CacheTtls};
use aerovia_core::booking::{validate_seat_count, Booking, BookingStatus, PassengerInfo};
use aerovia_core::error::{DomainError, DomainResult};
use aerovia_core::flight::Flight;
use aerovia_core::reference::generate_booking_reference;
use aerovia_core::repository::{BookingStore, UserStore};

use crate::flights::FlightService;

const MAX_REFERENCE_ATTEMPTS: u32 = 5;

/// Owns the booking lifecycle and its reconciliation with flight
/// inventory: a booking row exists only if its seats were atomically
/// taken from the flight, and cancellation returns them exactly once.
pub struct BookingLedger {
    flights: Arc<FlightService>,
    bookings: Arc<dyn BookingStore>,
    users: Arc<dyn UserStore>,
    cache: Arc<dyn Cache>,
    ttls: CacheTtls,
}

impl BookingLedger {
    pub fn new(
        flights: Arc<FlightService>,
        bookings: Arc<dyn BookingStore>,
        users: Arc<dyn UserStore>,
        cache: Arc<dyn Cache>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            flights,
            bookings,
            users,
            cache,
            ttls,
        }
    }

    pub async fn create_booking(
        &self,
        flight_id: Uuid,
        user_id: Uuid,
        passenger: &PassengerInfo,
        seats: i32,
    ) -> DomainResult<Booking> {
        validate_seat_count(seats)?;
        passenger.validate()?;

        let flight = self.flights.get_flight(flight_id).await?;

        // Fast-path rejection on an obviously full flight. Advisory only;
        // the conditional decrement below is the authority.
        if flight.available_seats < seats {
            return Err(DomainError::conflict("not enough seats available"));
        }

        if !self.flights.reserve_seats(&flight, seats).await? {
            info!(%flight_id, seats, "booking rejected, seats taken concurrently");
            return Err(DomainError::conflict("not enough seats available"));
        }

        // Seats are held from here on. Every failure before the booking
        // row lands must give them back.
        let user = match self.users.get_user(user_id).await {
            Ok(user) => user,
            Err(err) => {
                self.compensate(&flight, seats).await;
                return Err(err);
            }
        };

        let booking = match self.persist_booking(&flight, user.id, passenger, seats).await {
            Ok(booking) => booking,
            Err(err) => {
                self.compensate(&flight, seats).await;
                return Err(err);
            }
        };

        self.cache.delete(&keys::user_bookings(user.id)).await;
        info!(
            reference = %booking.booking_reference,
            %flight_id,
            seats,
            "booking confirmed"
        );
        Ok(booking)
    }

    pub async fn booking_by_reference(&self, reference: &str) -> DomainResult<Booking> {
        let key = keys::booking_by_reference(reference);
        if let Some(booking) = get_json::<Booking>(self.cache.as_ref(), &key).await {
            return Ok(booking);
        }
        let booking = self.bookings.get_by_reference(reference).await?;
        set_json(self.cache.as_ref(), &key, &booking, self.ttls.booking()).await;
        Ok(booking)
    }

    pub async fn bookings_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        let key = keys::user_bookings(user_id);
        if let Some(bookings) = get_json::<Vec<Booking>>(self.cache.as_ref(), &key).await {
            return Ok(bookings);
        }
        let bookings = self.bookings.list_by_user(user_id).await?;
        if !bookings.is_empty() {
            set_json(self.cache.as_ref(), &key, &bookings, self.ttls.user_bookings()).await;
        }
        Ok(bookings)
    }

    /// Cancels a confirmed booking and returns its seats to the flight.
    /// A second cancellation of the same reference fails with a conflict
    /// rather than silently succeeding.
    pub async fn cancel_booking(&self, reference: &str) -> DomainResult<()> {
        // The row read must hit the store, not a cached copy; the
        // conditional flip below is what makes two racing cancellations
        // release the seats only once.
        let booking = self.bookings.get_by_reference(reference).await?;

        if !self.bookings.try_cancel(booking.id).await? {
            return Err(DomainError::conflict("booking already cancelled"));
        }

        // The booking is CANCELLED from here on. If the seats cannot be
        // returned, the flip is undone so a retry can release them.
        match self.flights.get_flight(booking.flight_id).await {
            Ok(flight) => {
                if let Err(err) = self.flights.release_seats(&flight, booking.seats).await {
                    self.revert_cancellation(&booking).await;
                    return Err(err);
                }
            }
            Err(DomainError::NotFound { .. }) => {
                // Flight was deleted administratively; nothing to return
                // seats to.
                warn!(reference, flight_id = %booking.flight_id, "cancelled booking on deleted flight");
            }
            Err(err) => {
                self.revert_cancellation(&booking).await;
                return Err(err);
            }
        }

        self.cache.delete(&keys::booking_by_reference(reference)).await;
        self.cache.delete(&keys::user_bookings(booking.user_id)).await;
        info!(reference, "booking cancelled");
        Ok(())
    }

    async fn persist_booking(
        &self,
        flight: &Flight,
        user_id: Uuid,
        passenger: &PassengerInfo,
        seats: i32,
    ) -> DomainResult<Booking> {
        let total_price_amount = flight.price_amount * i64::from(seats);

        for attempt in 0..MAX_REFERENCE_ATTEMPTS {
            let now = Utc::now();
            let booking = Booking {
                id: Uuid::new_v4(),
                booking_reference: generate_booking_reference(),
                flight_id: flight.id,
                user_id,
                passenger_first_name: passenger.first_name.clone(),
                passenger_last_name: passenger.last_name.clone(),
                passenger_email: passenger.email.clone(),
                passenger_phone: passenger.phone.clone(),
                seats,
                total_price_amount,
                price_currency: flight.price_currency.clone(),
                status: BookingStatus::Confirmed,
                created_at: now,
                updated_at: now,
            };

            match self.bookings.insert_booking(&booking).await {
                Ok(()) => return Ok(booking),
                Err(DomainError::DuplicateReference(reference)) => {
                    warn!(reference, attempt, "booking reference collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }

        Err(DomainError::infra(format!(
            "could not generate a unique booking reference after {MAX_REFERENCE_ATTEMPTS} attempts"
        )))
    }

    async fn revert_cancellation(&self, booking: &Booking) {
        if let Err(err) = self
            .bookings
            .set_status(booking.id, BookingStatus::Confirmed)
            .await
        {
            // Seats stay lost until an operator reconciles; loud log so
            // it is noticed.
            tracing::error!(
                reference = %booking.booking_reference,
                %err,
                "could not undo cancellation after failed seat release"
            );
        }
    }

    async fn compensate(&self, flight: &Flight, seats: i32) {
        if let Err(err) = self.flights.release_seats(flight, seats).await {
            // Seats stay lost until an operator reconciles; loud log so
            // it is noticed.
            tracing::error!(flight_id = %flight.id, seats, %err, "seat compensation failed");
        }
    }
}
