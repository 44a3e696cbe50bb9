//! In-process store implementations. The flight store's mutex gives the
//! same serialization guarantee the Postgres conditional UPDATE gives:
//! check-and-decrement happens under one lock, so concurrent bookings
//! for the last seats cannot both succeed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use aerovia_core::booking::{Booking, BookingStatus};
use aerovia_core::error::{DomainError, DomainResult};
use aerovia_core::flight::{Flight, FlightSpec};
use aerovia_core::identity::IdentityAssertion;
use aerovia_core::repository::{BookingStore, FlightStore, UserStore};
use aerovia_core::search::SearchQuery;
use aerovia_core::user::{Role, User};

#[derive(Default)]
pub struct MemoryFlightStore {
    flights: Mutex<HashMap<Uuid, Flight>>,
}

impl MemoryFlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, flight: Flight) {
        self.flights.lock().unwrap().insert(flight.id, flight);
    }
}

#[async_trait]
impl FlightStore for MemoryFlightStore {
    async fn get_flight(&self, id: Uuid) -> DomainResult<Flight> {
        self.flights
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Flight", id))
    }

    async fn get_flight_by_number(&self, flight_number: &str) -> DomainResult<Flight> {
        let wanted = flight_number.to_uppercase();
        self.flights
            .lock()
            .unwrap()
            .values()
            .find(|f| f.flight_number == wanted)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Flight", flight_number))
    }

    async fn search_available(&self, query: &SearchQuery) -> DomainResult<Vec<Flight>> {
        let query = query.normalized();
        let mut matches: Vec<Flight> = self
            .flights
            .lock()
            .unwrap()
            .values()
            .filter(|f| {
                f.status == aerovia_core::flight::FlightStatus::Scheduled
                    && f.origin == query.origin
                    && f.destination == query.destination
                    && f.departure_time >= query.departing_after
                    && f.available_seats >= query.seats_needed
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.departure_time
                .cmp(&b.departure_time)
                .then(a.id.cmp(&b.id))
        });
        Ok(matches)
    }

    async fn try_decrease_seats(&self, flight_id: Uuid, seats: i32) -> DomainResult<bool> {
        let mut flights = self.flights.lock().unwrap();
        let Some(flight) = flights.get_mut(&flight_id) else {
            return Ok(false);
        };
        if flight.available_seats < seats {
            return Ok(false);
        }
        flight.available_seats -= seats;
        flight.updated_at = Utc::now();
        Ok(true)
    }

    async fn increase_seats(&self, flight_id: Uuid, seats: i32) -> DomainResult<()> {
        let mut flights = self.flights.lock().unwrap();
        let flight = flights
            .get_mut(&flight_id)
            .ok_or_else(|| DomainError::not_found("Flight", flight_id))?;
        flight.available_seats = (flight.available_seats + seats).min(flight.total_seats);
        flight.updated_at = Utc::now();
        Ok(())
    }

    async fn create_flight(&self, flight: &Flight) -> DomainResult<()> {
        let mut flights = self.flights.lock().unwrap();
        if flights
            .values()
            .any(|f| f.flight_number == flight.flight_number)
        {
            return Err(DomainError::conflict(format!(
                "flight number {} already exists",
                flight.flight_number
            )));
        }
        flights.insert(flight.id, flight.clone());
        Ok(())
    }

    async fn update_flight(&self, id: Uuid, spec: &FlightSpec) -> DomainResult<Flight> {
        let mut flights = self.flights.lock().unwrap();
        let flight = flights
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Flight", id))?;
        // Capacity changes shift available_seats by the same delta, so
        // available + sold == total stays true. Shrinking below the
        // sold count would drive available negative.
        let sold = flight.total_seats - flight.available_seats;
        if spec.total_seats < sold {
            return Err(DomainError::conflict(format!(
                "total_seats {} is below the {sold} seats already sold",
                spec.total_seats
            )));
        }
        flight.available_seats = spec.total_seats - sold;
        flight.airline = spec.airline.clone();
        flight.origin = spec.origin.to_uppercase();
        flight.destination = spec.destination.to_uppercase();
        flight.departure_time = spec.departure_time;
        flight.arrival_time = spec.arrival_time;
        flight.total_seats = spec.total_seats;
        flight.price_amount = spec.price_amount;
        flight.price_currency = spec.price_currency.clone();
        flight.updated_at = Utc::now();
        Ok(flight.clone())
    }

    async fn delete_flight(&self, id: Uuid) -> DomainResult<()> {
        self.flights
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Flight", id))
    }
}

#[derive(Default)]
pub struct MemoryBookingStore {
    bookings: Mutex<HashMap<Uuid, Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn insert_booking(&self, booking: &Booking) -> DomainResult<()> {
        let mut bookings = self.bookings.lock().unwrap();
        if bookings
            .values()
            .any(|b| b.booking_reference == booking.booking_reference)
        {
            return Err(DomainError::DuplicateReference(
                booking.booking_reference.clone(),
            ));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_by_reference(&self, reference: &str) -> DomainResult<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .values()
            .find(|b| b.booking_reference == reference)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Booking", reference))
    }

    async fn list_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Booking>> {
        let mut list: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn try_cancel(&self, id: Uuid) -> DomainResult<bool> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        if booking.status == BookingStatus::Cancelled {
            return Ok(false);
        }
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> DomainResult<()> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DomainError::not_found("User", email))
    }

    async fn upsert_from_identity(&self, identity: &IdentityAssertion) -> DomainResult<User> {
        let mut users = self.users.lock().unwrap();
        let now = Utc::now();
        if let Some(user) = users.values_mut().find(|u| u.email == identity.email) {
            user.external_id = Some(identity.subject.clone());
            if let Some(first) = &identity.first_name {
                user.first_name = first.clone();
            }
            if let Some(last) = &identity.last_name {
                user.last_name = last.clone();
            }
            user.updated_at = now;
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: identity.email.clone(),
            external_id: Some(identity.subject.clone()),
            first_name: identity.first_name.clone().unwrap_or_default(),
            last_name: identity.last_name.clone().unwrap_or_default(),
            phone: None,
            role: identity.role,
            active: true,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn flight(available: i32, total: i32) -> Flight {
        let dep = Utc::now() + Duration::days(3);
        let mut f = Flight::from_spec(&FlightSpec {
            flight_number: "AV100".to_string(),
            airline: "Aerovia".to_string(),
            origin: "SGN".to_string(),
            destination: "HAN".to_string(),
            departure_time: dep,
            arrival_time: dep + Duration::hours(2),
            total_seats: total,
            price_amount: 50_00,
            price_currency: "USD".to_string(),
        });
        f.available_seats = available;
        f
    }

    #[tokio::test]
    async fn test_try_decrease_is_all_or_nothing() {
        let store = MemoryFlightStore::new();
        let f = flight(2, 10);
        let id = f.id;
        store.seed(f);

        assert!(store.try_decrease_seats(id, 2).await.unwrap());
        assert!(!store.try_decrease_seats(id, 1).await.unwrap());
        assert_eq!(store.get_flight(id).await.unwrap().available_seats, 0);
    }

    #[tokio::test]
    async fn test_increase_never_exceeds_capacity() {
        let store = MemoryFlightStore::new();
        let f = flight(9, 10);
        let id = f.id;
        store.seed(f);

        store.increase_seats(id, 5).await.unwrap();
        assert_eq!(store.get_flight(id).await.unwrap().available_seats, 10);
    }

    #[tokio::test]
    async fn test_update_leaves_seat_counter_alone() {
        let store = MemoryFlightStore::new();
        let f = flight(4, 10);
        let id = f.id;
        let dep = f.departure_time;
        store.seed(f);

        let updated = store
            .update_flight(
                id,
                &FlightSpec {
                    flight_number: "AV100".to_string(),
                    airline: "Aerovia Express".to_string(),
                    origin: "SGN".to_string(),
                    destination: "DAD".to_string(),
                    departure_time: dep,
                    arrival_time: dep + Duration::hours(1),
                    total_seats: 10,
                    price_amount: 70_00,
                    price_currency: "USD".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.available_seats, 4);
        assert_eq!(updated.airline, "Aerovia Express");
    }

    #[tokio::test]
    async fn test_update_rejects_capacity_below_sold_seats() {
        let store = MemoryFlightStore::new();
        let f = flight(4, 10);
        let id = f.id;
        let dep = f.departure_time;
        store.seed(f);

        // 6 seats sold; shrinking to 2 would drive available negative.
        let err = store
            .update_flight(
                id,
                &FlightSpec {
                    flight_number: "AV100".to_string(),
                    airline: "Aerovia".to_string(),
                    origin: "SGN".to_string(),
                    destination: "HAN".to_string(),
                    departure_time: dep,
                    arrival_time: dep + Duration::hours(2),
                    total_seats: 2,
                    price_amount: 50_00,
                    price_currency: "USD".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let untouched = store.get_flight(id).await.unwrap();
        assert_eq!(untouched.total_seats, 10);
        assert_eq!(untouched.available_seats, 4);
    }

    #[tokio::test]
    async fn test_update_capacity_change_shifts_available_seats() {
        let store = MemoryFlightStore::new();
        let f = flight(4, 10);
        let id = f.id;
        let dep = f.departure_time;
        store.seed(f);

        let spec = |total| FlightSpec {
            flight_number: "AV100".to_string(),
            airline: "Aerovia".to_string(),
            origin: "SGN".to_string(),
            destination: "HAN".to_string(),
            departure_time: dep,
            arrival_time: dep + Duration::hours(2),
            total_seats: total,
            price_amount: 50_00,
            price_currency: "USD".to_string(),
        };

        let grown = store.update_flight(id, &spec(12)).await.unwrap();
        assert_eq!(grown.available_seats, 6);

        // Shrinking to exactly the sold count leaves nothing for sale.
        let shrunk = store.update_flight(id, &spec(6)).await.unwrap();
        assert_eq!(shrunk.available_seats, 0);
    }

    #[tokio::test]
    async fn test_try_cancel_flips_exactly_once() {
        let store = MemoryBookingStore::new();
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_reference: "BKTEST00AA".to_string(),
            flight_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            passenger_first_name: "Minh".to_string(),
            passenger_last_name: "Pham".to_string(),
            passenger_email: "minh.pham@example.com".to_string(),
            passenger_phone: "+84900000000".to_string(),
            seats: 2,
            total_price_amount: 100_00,
            price_currency: "USD".to_string(),
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };
        store.insert_booking(&booking).await.unwrap();

        assert!(store.try_cancel(booking.id).await.unwrap());
        assert!(!store.try_cancel(booking.id).await.unwrap());
        let stored = store.get_by_reference("BKTEST00AA").await.unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_instead_of_duplicating() {
        let store = MemoryUserStore::new();
        let identity = IdentityAssertion {
            subject: "auth0|first".to_string(),
            email: "pat@example.com".to_string(),
            first_name: Some("Pat".to_string()),
            last_name: Some("Ngo".to_string()),
            role: Role::User,
        };

        let created = store.upsert_from_identity(&identity).await.unwrap();

        let refreshed = store
            .upsert_from_identity(&IdentityAssertion {
                subject: "auth0|rotated".to_string(),
                ..identity
            })
            .await
            .unwrap();

        assert_eq!(created.id, refreshed.id);
        assert_eq!(refreshed.external_id.as_deref(), Some("auth0|rotated"));

        let by_email = store.get_by_email("pat@example.com").await.unwrap();
        assert_eq!(by_email.id, created.id);
        let by_id = store.get_user(created.id).await.unwrap();
        assert_eq!(by_id.email, "pat@example.com");
    }
}
