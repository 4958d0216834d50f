//! The reservation registry: a fixed table of seats, one mutex per seat.
//!
//! Every transition out of `Locked` cancels the seat's expiry timer, and
//! every timer re-checks the seat before touching it, so a late timer can
//! never release a newer lock.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::clock::{Clock, TokioClock};
use crate::config::{ConfigError, RegistryConfig};
use crate::expiry::ExpiryTimer;
use crate::types::{
    ReservationError, SeatId, SeatRecord, SeatState, SeatStats, SeatStatus, UnlockOutcome,
};

struct SeatSlot {
    state: SeatState,
    /// Present iff `state` is `Locked`
    timer: Option<ExpiryTimer>,
}

impl SeatSlot {
    fn available() -> Self {
        Self {
            state: SeatState::Available,
            timer: None,
        }
    }

    /// Back to `Available`, aborting any pending timer.
    fn clear(&mut self) {
        self.timer = None;
        self.state = SeatState::Available;
    }

    /// Lazy expiry. Returns true if a lapsed lock was cleared.
    fn expire_if_lapsed(&mut self, now: u64) -> bool {
        if self.state.lock_lapsed(now) {
            self.clear();
            true
        } else {
            false
        }
    }

    fn book(&mut self) {
        self.timer = None;
        match std::mem::replace(&mut self.state, SeatState::Available) {
            SeatState::Locked { holder, .. } => self.state = SeatState::Booked { holder },
            other => panic!("book() called on a seat in state {:?}", other.status()),
        }
    }
}

struct RegistryInner {
    seats: Box<[Mutex<SeatSlot>]>,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
    runtime: Handle,
}

/// Shared handle to the seat table. Cloning is cheap.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Builds a registry on the current tokio runtime with the tokio clock.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        Self::with_clock(config, Arc::new(TokioClock::new()), runtime)
    }

    pub fn with_clock(
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
        runtime: Handle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let seats = (0..config.seat_count)
            .map(|_| Mutex::new(SeatSlot::available()))
            .collect();
        debug!(
            seats = config.seat_count,
            ttl_ms = config.lock_ttl.as_millis() as u64,
            "Registry created"
        );
        Ok(Self {
            inner: Arc::new(RegistryInner {
                seats,
                config,
                clock,
                runtime,
            }),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> + use<> {
        (1..=self.inner.config.seat_count).map(SeatId)
    }

    /// Lock a seat for `user` with the configured TTL.
    pub fn lock(&self, seat: SeatId, user: &str) -> Result<SeatRecord, ReservationError> {
        self.lock_for(seat, user, self.inner.config.lock_ttl)
    }

    /// Lock a seat for `user` with an explicit TTL.
    pub fn lock_for(
        &self,
        seat: SeatId,
        user: &str,
        ttl: Duration,
    ) -> Result<SeatRecord, ReservationError> {
        validate_identity(user)?;
        let mut slot = self.inner.slot(seat)?;
        let now = self.inner.clock.now_ms();

        if slot.expire_if_lapsed(now) {
            debug!(%seat, "Lapsed lock cleared before relock");
        }

        match slot.state.status() {
            SeatStatus::Locked => return Err(ReservationError::AlreadyLocked(seat)),
            SeatStatus::Booked => return Err(ReservationError::AlreadyBooked(seat)),
            SeatStatus::Available => {}
        }

        let lock_expires_at = deadline_after(now, ttl);
        // Cancel before arming so a seat never has two live timers.
        slot.timer = None;
        slot.state = SeatState::Locked {
            holder: user.to_string(),
            lock_expires_at,
        };
        slot.timer = Some(
            self.inner.arm_expiry(
                seat,
                lock_expires_at,
                ttl.saturating_add(self.inner.config.expiry_margin),
            ),
        );

        debug!(%seat, user, lock_expires_at, "Seat locked");
        Ok(SeatRecord::new(seat, &slot.state))
    }

    /// Turn the caller's unexpired lock into a booking.
    pub fn confirm(&self, seat: SeatId, user: &str) -> Result<SeatRecord, ReservationError> {
        validate_identity(user)?;
        let mut slot = self.inner.slot(seat)?;
        let now = self.inner.clock.now_ms();

        let SeatState::Locked { holder, .. } = &slot.state else {
            return Err(ReservationError::NotLocked(seat));
        };
        let is_holder = holder == user;

        if slot.expire_if_lapsed(now) {
            debug!(%seat, user, "Confirm rejected, lock lapsed");
            return Err(ReservationError::LockExpired(seat));
        }
        if !is_holder {
            return Err(ReservationError::WrongHolder(seat));
        }

        slot.book();
        debug!(%seat, user, "Seat booked");
        Ok(SeatRecord::new(seat, &slot.state))
    }

    /// Give up the caller's lock.
    pub fn release(&self, seat: SeatId, user: &str) -> Result<SeatRecord, ReservationError> {
        validate_identity(user)?;
        let mut slot = self.inner.slot(seat)?;
        let now = self.inner.clock.now_ms();

        slot.expire_if_lapsed(now);
        match &slot.state {
            SeatState::Locked { holder, .. } if holder == user => {}
            SeatState::Locked { .. } => return Err(ReservationError::WrongHolder(seat)),
            _ => return Err(ReservationError::NotLocked(seat)),
        }

        slot.clear();
        debug!(%seat, user, "Seat released");
        Ok(SeatRecord::new(seat, &slot.state))
    }

    /// Administrative override: clear a lock regardless of holder.
    ///
    /// Bookings are not touched. Unlocking a free seat is a no-op.
    pub fn unlock(&self, seat: SeatId) -> Result<UnlockOutcome, ReservationError> {
        let mut slot = self.inner.slot(seat)?;
        let now = self.inner.clock.now_ms();

        slot.expire_if_lapsed(now);
        match slot.state.status() {
            SeatStatus::Available => Ok(UnlockOutcome::AlreadyAvailable(SeatRecord::new(
                seat,
                &slot.state,
            ))),
            SeatStatus::Booked => Err(ReservationError::Immutable(seat)),
            SeatStatus::Locked => {
                slot.clear();
                info!(%seat, "Seat unlocked by admin");
                Ok(UnlockOutcome::Unlocked(SeatRecord::new(seat, &slot.state)))
            }
        }
    }

    /// Detailed record of a single seat.
    pub fn get(&self, seat: SeatId) -> Result<SeatRecord, ReservationError> {
        let mut slot = self.inner.slot(seat)?;
        slot.expire_if_lapsed(self.inner.clock.now_ms());
        Ok(SeatRecord::new(seat, &slot.state))
    }

    /// Status of every seat, without holder or deadline.
    pub fn list(&self) -> Vec<SeatRecord> {
        self.list_detailed()
            .into_iter()
            .map(SeatRecord::public)
            .collect()
    }

    /// Full records of every seat.
    pub fn list_detailed(&self) -> Vec<SeatRecord> {
        let now = self.inner.clock.now_ms();
        self.inner
            .seats
            .iter()
            .zip(self.seat_ids())
            .map(|(slot, seat)| {
                let mut slot = lock_slot(slot);
                slot.expire_if_lapsed(now);
                SeatRecord::new(seat, &slot.state)
            })
            .collect()
    }

    /// Clears every lapsed lock. Returns how many were cleared.
    pub fn sweep_expired(&self) -> usize {
        let now = self.inner.clock.now_ms();
        let swept = self
            .inner
            .seats
            .iter()
            .filter(|slot| lock_slot(slot).expire_if_lapsed(now))
            .count();
        if swept > 0 {
            info!(swept, "Lapsed locks swept");
        }
        swept
    }

    pub fn stats(&self) -> SeatStats {
        self.list_detailed()
            .iter()
            .fold(SeatStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.status {
                    SeatStatus::Available => stats.available += 1,
                    SeatStatus::Locked => stats.locked += 1,
                    SeatStatus::Booked => stats.booked += 1,
                }
                stats
            })
    }

    /// Raw state without lazy normalisation.
    #[cfg(test)]
    pub(crate) fn peek(&self, seat: SeatId) -> Option<SeatState> {
        Some(self.inner.slot(seat).ok()?.state.clone())
    }

    /// Runs the expiry callback as if the timer armed for `deadline` fired.
    #[cfg(test)]
    pub(crate) fn fire_expiry(&self, seat: SeatId, deadline: u64) {
        self.inner.expire(seat, deadline);
    }

    #[cfg(test)]
    pub(crate) fn pending_timer(&self, seat: SeatId) -> Option<u64> {
        self.inner
            .slot(seat)
            .ok()?
            .timer
            .as_ref()
            .filter(|timer| !timer.is_finished())
            .map(ExpiryTimer::deadline)
    }
}

impl RegistryInner {
    fn slot(&self, seat: SeatId) -> Result<MutexGuard<'_, SeatSlot>, ReservationError> {
        let index = seat
            .slot(self.seats.len())
            .ok_or(ReservationError::NotFound(seat))?;
        Ok(lock_slot(&self.seats[index]))
    }

    fn arm_expiry(self: &Arc<Self>, seat: SeatId, deadline: u64, delay: Duration) -> ExpiryTimer {
        let registry: Weak<Self> = Arc::downgrade(self);
        ExpiryTimer::arm(&self.runtime, delay, deadline, move || {
            if let Some(registry) = registry.upgrade() {
                registry.expire(seat, deadline);
            }
        })
    }

    /// Timer callback. Only clears the exact lock it was armed for, and only
    /// once that lock's deadline has passed.
    fn expire(self: &Arc<Self>, seat: SeatId, armed_deadline: u64) {
        let Ok(mut slot) = self.slot(seat) else {
            return;
        };
        let now = self.clock.now_ms();

        let holder = match &slot.state {
            SeatState::Locked { holder, lock_expires_at } if *lock_expires_at == armed_deadline => {
                holder.clone()
            }
            state => {
                warn!(
                    %seat,
                    status = %state.status(),
                    armed_deadline,
                    "Stale expiry timer ignored"
                );
                return;
            }
        };

        if armed_deadline <= now {
            info!(%seat, holder = %holder, "Lock expired");
            slot.clear();
        } else {
            // Woke before the deadline; wait out the remainder.
            let remaining = Duration::from_millis(armed_deadline - now)
                .saturating_add(self.config.expiry_margin);
            slot.timer = Some(self.arm_expiry(seat, armed_deadline, remaining));
        }
    }
}

fn lock_slot(seat: &Mutex<SeatSlot>) -> MutexGuard<'_, SeatSlot> {
    // Poisoning means a panic interrupted a transition; the seat can no
    // longer be trusted.
    seat.lock().expect("seat state poisoned")
}

/// `now + ttl` in epoch ms, saturating at `u64::MAX` for TTLs that do
/// not fit.
fn deadline_after(now: u64, ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis())
        .ok()
        .and_then(|ms| now.checked_add(ms))
        .unwrap_or(u64::MAX)
}

fn validate_identity(user: &str) -> Result<(), ReservationError> {
    if user.trim().is_empty() {
        Err(ReservationError::InvalidIdentity)
    } else {
        Ok(())
    }
}
