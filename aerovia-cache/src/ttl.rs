use std::time::Duration;

use serde::Deserialize;

/// Per-namespace time-to-live policy. Search results expire fastest
/// because seat counts shift under them; flight records are the most
/// stable.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheTtls {
    #[serde(default = "default_flight_secs")]
    pub flight_secs: u64,
    #[serde(default = "default_search_secs")]
    pub search_secs: u64,
    #[serde(default = "default_booking_secs")]
    pub booking_secs: u64,
    #[serde(default = "default_user_bookings_secs")]
    pub user_bookings_secs: u64,
}

fn default_flight_secs() -> u64 {
    600
}
fn default_search_secs() -> u64 {
    60
}
fn default_booking_secs() -> u64 {
    300
}
fn default_user_bookings_secs() -> u64 {
    60
}

impl Default for CacheTtls {
    fn default() -> Self {
        CacheTtls {
            flight_secs: default_flight_secs(),
            search_secs: default_search_secs(),
            booking_secs: default_booking_secs(),
            user_bookings_secs: default_user_bookings_secs(),
        }
    }
}

impl CacheTtls {
    pub fn flight(&self) -> Duration {
        Duration::from_secs(self.flight_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }

    pub fn booking(&self) -> Duration {
        Duration::from_secs(self.booking_secs)
    }

    pub fn user_bookings(&self) -> Duration {
        Duration::from_secs(self.user_bookings_secs)
    }
}
