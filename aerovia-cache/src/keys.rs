//! Deterministic cache-key construction. Every mutation path must
//! invalidate exactly the keys built here, so key shapes live in one
//! place.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix covering every cached search result. Any flight mutation can
/// make any cached search stale, so the whole namespace is evicted at
/// once.
pub const SEARCH_PREFIX: &str = "search:";

pub fn flight_by_id(id: Uuid) -> String {
    format!("flight:id:{id}")
}

pub fn flight_by_number(flight_number: &str) -> String {
    format!("flight:number:{}", flight_number.to_uppercase())
}

pub fn search(
    origin: &str,
    destination: &str,
    departing_after: DateTime<Utc>,
    seats_needed: i32,
) -> String {
    format!(
        "{SEARCH_PREFIX}{}:{}:{}:{}",
        origin.to_uppercase(),
        destination.to_uppercase(),
        departing_after.timestamp(),
        seats_needed
    )
}

pub fn booking_by_reference(reference: &str) -> String {
    format!("booking:ref:{reference}")
}

pub fn user_bookings(user_id: Uuid) -> String {
    format!("user:{user_id}:bookings")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_deterministic_and_case_normalized() {
        let id = Uuid::new_v4();
        assert_eq!(flight_by_id(id), flight_by_id(id));
        assert_eq!(flight_by_number("vn123"), flight_by_number("VN123"));

        let at = Utc::now();
        let key = search("sgn", "han", at, 2);
        assert!(key.starts_with(SEARCH_PREFIX));
        assert_eq!(key, search("SGN", "HAN", at, 2));
    }
}
