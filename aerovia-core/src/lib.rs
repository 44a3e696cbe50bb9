pub mod booking;
pub mod error;
pub mod flight;
pub mod identity;
pub mod reference;
pub mod repository;
pub mod search;
pub mod user;

pub use error::{DomainError, DomainResult};
