use std::sync::Arc;

use aerovia_ledger::{BookingLedger, FlightService, UserService};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightService>,
    pub ledger: Arc<BookingLedger>,
    pub users: Arc<UserService>,
    pub auth: AuthConfig,
}
