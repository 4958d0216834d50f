use serde::{Deserialize, Serialize};

/// Stable key of a seat in the fixed pool (`1..=seat_count`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub u32);

impl SeatId {
    /// Zero-based slot index for a table of `seat_count` seats, if in range.
    pub fn slot(self, seat_count: usize) -> Option<usize> {
        let index = (self.0 as usize).checked_sub(1)?;
        (index < seat_count).then_some(index)
    }
}

impl From<u32> for SeatId {
    fn from(id: u32) -> Self {
        SeatId(id)
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    /// Free to lock
    Available,
    /// Held by one client until confirmed, released or expired
    Locked,
    /// Confirmed; terminal under normal operations
    Booked,
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatStatus::Available => write!(f, "AVAILABLE"),
            SeatStatus::Locked => write!(f, "LOCKED"),
            SeatStatus::Booked => write!(f, "BOOKED"),
        }
    }
}

/// Internal reservation state of one seat.
///
/// Holder and deadline only exist on the variants that own them, so a
/// `Locked` seat without a deadline cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatState {
    Available,
    Locked { holder: String, lock_expires_at: u64 },
    Booked { holder: String },
}

impl SeatState {
    pub fn status(&self) -> SeatStatus {
        match self {
            SeatState::Available => SeatStatus::Available,
            SeatState::Locked { .. } => SeatStatus::Locked,
            SeatState::Booked { .. } => SeatStatus::Booked,
        }
    }

    pub fn holder(&self) -> Option<&str> {
        match self {
            SeatState::Available => None,
            SeatState::Locked { holder, .. } | SeatState::Booked { holder } => Some(holder),
        }
    }

    pub fn lock_expires_at(&self) -> Option<u64> {
        match self {
            SeatState::Locked { lock_expires_at, .. } => Some(*lock_expires_at),
            _ => None,
        }
    }

    /// True when the seat is locked and its deadline is at or before `now`.
    pub fn lock_lapsed(&self, now: u64) -> bool {
        matches!(self, SeatState::Locked { lock_expires_at, .. } if *lock_expires_at <= now)
    }
}

/// Serializable view of a seat's reservation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub seat_id: SeatId,
    pub status: SeatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    /// Epoch milliseconds; present only while locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_expires_at: Option<u64>,
}

impl SeatRecord {
    pub fn new(seat_id: SeatId, state: &SeatState) -> Self {
        Self {
            seat_id,
            status: state.status(),
            holder: state.holder().map(str::to_string),
            lock_expires_at: state.lock_expires_at(),
        }
    }

    /// Strips holder identity and deadline for unauthenticated observers.
    pub fn public(self) -> Self {
        Self {
            holder: None,
            lock_expires_at: None,
            ..self
        }
    }
}

/// Result of an administrative unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "seat", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnlockOutcome {
    /// A lock was cleared
    Unlocked(SeatRecord),
    /// The seat was already free; nothing changed
    AlreadyAvailable(SeatRecord),
}

impl UnlockOutcome {
    pub fn record(&self) -> &SeatRecord {
        match self {
            UnlockOutcome::Unlocked(record) | UnlockOutcome::AlreadyAvailable(record) => record,
        }
    }
}

/// Seat counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStats {
    pub total: usize,
    pub available: usize,
    pub locked: usize,
    pub booked: usize,
}
