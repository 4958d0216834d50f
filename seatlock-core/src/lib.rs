//! # seatlock-core
//!
//! Reservation registry for a fixed pool of seats. Seats are locked for a
//! bounded time, then confirmed into bookings or released; abandoned locks
//! expire on their own.

pub mod clock;
pub mod config;
pub mod expiry;
pub mod registry;
pub mod types;

pub use config::{ConfigError, RegistryConfig};
pub use registry::Registry;

#[cfg(test)]
mod expiry_test;
