mod booking_store;
mod flight_store;
mod user_store;

pub use booking_store::PostgresBookingStore;
pub use flight_store::PostgresFlightStore;
pub use user_store::PostgresUserStore;

use aerovia_core::DomainError;

pub(crate) fn map_sqlx(err: sqlx::Error) -> DomainError {
    DomainError::infra(err)
}

pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or(""))
        }
        _ => None,
    }
}
