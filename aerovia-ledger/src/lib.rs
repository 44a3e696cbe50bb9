pub mod bookings;
pub mod flights;
pub mod users;

pub use bookings::BookingLedger;
pub use flights::FlightService;
pub use users::UserService;
