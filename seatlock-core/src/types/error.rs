use thiserror::Error;

use super::SeatId;

/// Expected, caller-recoverable failures of registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    #[error("seat {0} does not exist")]
    NotFound(SeatId),

    #[error("caller identity is missing or empty")]
    InvalidIdentity,

    #[error("seat {0} is already locked")]
    AlreadyLocked(SeatId),

    #[error("seat {0} is already booked")]
    AlreadyBooked(SeatId),

    #[error("seat {0} is not locked")]
    NotLocked(SeatId),

    /// The caller held the lock but its deadline passed; a fresh lock is needed.
    #[error("lock on seat {0} has expired")]
    LockExpired(SeatId),

    #[error("seat {0} is held by another user")]
    WrongHolder(SeatId),

    #[error("seat {0} is booked and cannot be unlocked")]
    Immutable(SeatId),
}

impl ReservationError {
    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            ReservationError::NotFound(_) => "SEAT_NOT_FOUND",
            ReservationError::InvalidIdentity => "INVALID_IDENTITY",
            ReservationError::AlreadyLocked(_) => "ALREADY_LOCKED",
            ReservationError::AlreadyBooked(_) => "ALREADY_BOOKED",
            ReservationError::NotLocked(_) => "NOT_LOCKED",
            ReservationError::LockExpired(_) => "LOCK_EXPIRED",
            ReservationError::WrongHolder(_) => "WRONG_HOLDER",
            ReservationError::Immutable(_) => "IMMUTABLE",
        }
    }
}
