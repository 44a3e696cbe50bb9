use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::error::DomainResult;
use crate::flight::{Flight, FlightSpec};
use crate::identity::IdentityAssertion;
use crate::search::SearchQuery;
use crate::user::User;

/// Flight inventory store: owns flight rows and the live seat counter.
///
/// `try_decrease_seats` is the single serialization point that prevents
/// overselling; implementations must make it behave as an atomic
/// check-and-decrement (conditional UPDATE against Postgres, mutex-guarded
/// read-modify-write in memory). Nothing else may touch `available_seats`.
#[async_trait]
pub trait FlightStore: Send + Sync {
    async fn get_flight(&self, id: Uuid) -> DomainResult<Flight>;

    async fn get_flight_by_number(&self, flight_number: &str) -> DomainResult<Flight>;

    /// Scheduled flights on the route departing at or after the cutoff
    /// with at least `seats_needed` open seats, ordered by
    /// (departure_time, id).
    async fn search_available(&self, query: &SearchQuery) -> DomainResult<Vec<Flight>>;

    /// Atomically decrements `available_seats` by `seats` if at least
    /// that many remain. Returns false, with no side effects, otherwise.
    async fn try_decrease_seats(&self, flight_id: Uuid, seats: i32) -> DomainResult<bool>;

    /// Returns seats to the pool, clamped so `available_seats` never
    /// exceeds `total_seats`. Atomic with respect to concurrent
    /// decrements on the same flight.
    async fn increase_seats(&self, flight_id: Uuid, seats: i32) -> DomainResult<()>;

    async fn create_flight(&self, flight: &Flight) -> DomainResult<()>;

    /// Administrative update. A capacity change shifts `available_seats`
    /// by the same delta so `available + sold == total` keeps holding;
    /// shrinking `total_seats` below the sold count is a conflict.
    /// Bookings and cancellations still move the counter only through
    /// the decrease/increase operations.
    async fn update_flight(&self, id: Uuid, spec: &FlightSpec) -> DomainResult<Flight>;

    async fn delete_flight(&self, id: Uuid) -> DomainResult<()>;
}

/// Booking record store. Insert surfaces `DomainError::DuplicateReference`
/// on a booking-reference collision so the ledger can retry.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert_booking(&self, booking: &Booking) -> DomainResult<()>;

    async fn get_by_reference(&self, reference: &str) -> DomainResult<Booking>;

    async fn list_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Booking>>;

    /// Atomically flips the booking to CANCELLED if it is not cancelled
    /// yet. Returns false, with no write, when the booking was already
    /// cancelled; of two concurrent cancellations exactly one sees true.
    async fn try_cancel(&self, id: Uuid) -> DomainResult<bool>;

    async fn set_status(&self, id: Uuid, status: BookingStatus) -> DomainResult<()>;
}

/// User store. `upsert_from_identity` must be atomic on the unique email
/// constraint so concurrent first logins never create duplicate rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> DomainResult<User>;

    async fn get_by_email(&self, email: &str) -> DomainResult<User>;

    /// Insert-or-update keyed by email, refreshing the external subject
    /// id and name claims on every login.
    async fn upsert_from_identity(&self, identity: &IdentityAssertion) -> DomainResult<User>;
}
