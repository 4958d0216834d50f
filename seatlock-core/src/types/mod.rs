mod error;
mod seat;

pub use error::ReservationError;
pub use seat::{SeatId, SeatRecord, SeatState, SeatStats, SeatStatus, UnlockOutcome};
