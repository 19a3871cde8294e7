//! Thread-safe handle to a running transport.

use super::clock::TransportMessage;
use super::fsm::TransportState;
use super::sync::{ClockStatus, ClockSync};
use crate::lockfree::{AtomicEnum, AtomicFlag};
use crate::Position;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// State published by the transport loop.
#[derive(Debug)]
pub(crate) struct TransportShared {
    pub(crate) state: AtomicEnum<TransportState>,
    pub(crate) stop_requested: AtomicFlag,
    pub(crate) ticks: AtomicU64,
    pub(crate) ticks_per_beat: u32,
    pub(crate) sync: ClockSync,
}

impl TransportShared {
    pub(crate) fn new(ticks_per_beat: u32) -> Self {
        Self {
            state: AtomicEnum::new(TransportState::Stopped),
            stop_requested: AtomicFlag::new(false),
            ticks: AtomicU64::new(0),
            ticks_per_beat,
            sync: ClockSync::new(),
        }
    }
}

/// Cloneable, `Send` view of a [`Transport`](super::Transport).
///
/// Reads are lock-free. `stop` can be called from any thread, including a
/// signal handler thread or a UI.
///
/// # Example
/// ```ignore
/// let handle = transport.handle();
/// std::thread::spawn(move || {
///     std::thread::sleep(Duration::from_secs(30));
///     handle.stop();
/// });
/// transport.start()?;
/// ```
#[derive(Debug, Clone)]
pub struct TransportHandle {
    shared: Arc<TransportShared>,
    sender: Sender<TransportMessage>,
}

impl TransportHandle {
    pub(crate) fn new(shared: Arc<TransportShared>, sender: Sender<TransportMessage>) -> Self {
        Self { shared, sender }
    }

    /// Ask the transport loop to stop. Returns immediately; `start()` returns
    /// on the loop's thread once `after_stop` hooks have run.
    pub fn stop(&self) {
        self.shared.stop_requested.set(true);
        // Wake the loop if it is blocked waiting for the clock.
        let _ = self.sender.send(TransportMessage::StopRequested);
    }

    pub fn state(&self) -> TransportState {
        self.shared.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TransportState::Running
    }

    pub fn clock_status(&self) -> ClockStatus {
        self.shared.sync.status()
    }

    pub fn clock_sync(&self) -> &ClockSync {
        &self.shared.sync
    }

    /// Ticks received in the current run.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }

    pub fn position(&self) -> Position {
        Position::from_ticks(self.ticks(), self.shared.ticks_per_beat)
    }
}
