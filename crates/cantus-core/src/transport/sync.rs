//! Clock synchronisation status.
//!
//! The transport loop records how well the clock is behaving; other threads
//! read it lock-free through [`TransportHandle`](super::TransportHandle).

use crate::lockfree::{AtomicEnum, AtomicRepr};
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock lock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ClockStatus {
    /// No tick received yet in this run.
    #[default]
    Unlocked = 0,
    /// Ticks arriving in order.
    Locked = 1,
    /// No clock message within the stall timeout.
    Stalled = 2,
    /// Last absolute tick or song position pointed backwards and was dropped.
    Backward = 3,
}

impl AtomicRepr for ClockStatus {
    fn to_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ClockStatus::Locked,
            2 => ClockStatus::Stalled,
            3 => ClockStatus::Backward,
            _ => ClockStatus::Unlocked,
        }
    }
}

/// Lock-free clock health counters.
#[derive(Debug)]
pub struct ClockSync {
    status: AtomicEnum<ClockStatus>,
    stalls: AtomicU64,
    rejected: AtomicU64,
}

impl Default for ClockSync {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSync {
    pub fn new() -> Self {
        Self {
            status: AtomicEnum::new(ClockStatus::Unlocked),
            stalls: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn status(&self) -> ClockStatus {
        self.status.get()
    }

    /// Number of stall timeouts since the transport was created.
    pub fn stalls(&self) -> u64 {
        self.stalls.load(Ordering::Acquire)
    }

    /// Number of backward clock messages dropped since the transport was
    /// created.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.status.set(ClockStatus::Unlocked);
    }

    /// Returns the previous status.
    pub(crate) fn mark_locked(&self) -> ClockStatus {
        self.status.replace(ClockStatus::Locked)
    }

    pub(crate) fn mark_stalled(&self) {
        self.status.set(ClockStatus::Stalled);
        self.stalls.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn mark_backward(&self) {
        self.status.set(ClockStatus::Backward);
        self.rejected.fetch_add(1, Ordering::AcqRel);
    }
}
