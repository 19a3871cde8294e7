//! Tick sources driving the transport.

use crate::config::Tempo;
use crate::lockfree::AtomicFlag;
use crate::{Error, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Message produced by a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Start,
    Continue,
    Stop,
    /// Advance by one tick.
    Tick,
    /// Absolute tick count since start, for time-stamped feeds.
    TickAt(u64),
    /// Locate to a position counted in sixteenth notes. The target tick is
    /// `sixteenths * ticks_per_beat / 4`, rounded down when `ticks_per_beat`
    /// is not a multiple of 4.
    SongPosition(u32),
}

/// Everything the transport loop can be woken up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMessage {
    Clock(ClockEvent),
    StopRequested,
    /// The clock's producer went away for good.
    ClockLost,
}

/// Sending half handed to a clock when it starts.
#[derive(Debug, Clone)]
pub struct ClockSink {
    sender: Sender<TransportMessage>,
}

impl ClockSink {
    pub(crate) fn new(sender: Sender<TransportMessage>) -> Self {
        Self { sender }
    }

    /// Returns `false` once the transport is gone.
    #[inline]
    pub fn send(&self, event: ClockEvent) -> bool {
        self.sender.send(TransportMessage::Clock(event)).is_ok()
    }

    /// Tell the transport that no more events will arrive. A running
    /// transport stops with [`Error::ClockDisconnected`].
    pub fn disconnect(&self) -> bool {
        self.sender.send(TransportMessage::ClockLost).is_ok()
    }
}

/// A source of tick events.
pub trait Clock: Send {
    fn start(&mut self, sink: ClockSink) -> Result<()>;

    fn stop(&mut self);

    fn name(&self) -> &str;
}

/// Internal clock ticking at a fixed tempo from its own thread.
///
/// Ticks are scheduled against absolute deadlines measured from the start
/// instant, so sleep jitter never accumulates into drift.
pub struct TimerClock {
    tempo: Tempo,
    ticks_per_beat: u32,
    running: Arc<AtomicFlag>,
    /// Dropped to wake the thread out of its wait between ticks.
    wake: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TimerClock {
    pub fn new(tempo: Tempo, ticks_per_beat: u32) -> Self {
        Self {
            tempo,
            ticks_per_beat,
            running: Arc::new(AtomicFlag::new(false)),
            wake: None,
            thread: None,
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Clock for TimerClock {
    fn start(&mut self, sink: ClockSink) -> Result<()> {
        self.stop();

        let period = self.tempo.tick_period(self.ticks_per_beat);
        let running = Arc::clone(&self.running);
        let (wake, woken) = bounded::<()>(1);
        running.set(true);

        let handle = thread::Builder::new()
            .name("cantus-timer-clock".into())
            .spawn(move || {
                if !sink.send(ClockEvent::Start) {
                    return;
                }
                let origin = Instant::now();
                let mut tick: u64 = 0;
                while running.get() {
                    tick += 1;
                    match woken.recv_deadline(origin + tick_offset(period, tick)) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    if !running.get() || !sink.send(ClockEvent::Tick) {
                        break;
                    }
                }
            })
            .map_err(|e| {
                self.running.set(false);
                Error::ClockStart {
                    clock: "timer".into(),
                    message: e.to_string(),
                }
            })?;

        tracing::debug!(
            "Timer clock started at {} BPM, {} ticks per beat",
            self.tempo.bpm(),
            self.ticks_per_beat
        );
        self.wake = Some(wake);
        self.thread = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.set(false);
        self.wake.take();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!("Timer clock thread panicked");
            }
        }
    }

    fn name(&self) -> &str {
        "timer"
    }
}

impl Drop for TimerClock {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Offset of tick `n` from the clock origin.
fn tick_offset(period: Duration, tick: u64) -> Duration {
    let nanos = period.as_nanos().saturating_mul(u128::from(tick));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

struct FeedShared {
    sink: Mutex<Option<ClockSink>>,
    /// Live [`ExternalClockFeed`] handles.
    feeds: AtomicUsize,
}

/// Clock fed from outside (MIDI clock input, tests, another process).
///
/// Events pushed into the paired [`ExternalClockFeed`] are forwarded to the
/// transport exactly as received while the clock is started, and dropped
/// otherwise. Dropping the last feed while the clock is started ends the
/// run with [`Error::ClockDisconnected`].
pub struct ExternalClock {
    name: String,
    shared: Arc<FeedShared>,
}

impl ExternalClock {
    pub fn new(name: impl Into<String>) -> (Self, ExternalClockFeed) {
        let shared = Arc::new(FeedShared {
            sink: Mutex::new(None),
            feeds: AtomicUsize::new(1),
        });
        let feed = ExternalClockFeed {
            shared: Arc::clone(&shared),
        };
        (
            Self {
                name: name.into(),
                shared,
            },
            feed,
        )
    }
}

impl Clock for ExternalClock {
    fn start(&mut self, sink: ClockSink) -> Result<()> {
        let mut slot = self.shared.sink.lock();
        if self.shared.feeds.load(Ordering::Acquire) == 0 {
            return Err(Error::ClockDisconnected);
        }
        *slot = Some(sink);
        tracing::debug!("External clock '{}' connected", self.name);
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.sink.lock().take();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Producer side of an [`ExternalClock`]. Cheap to clone and `Send`.
pub struct ExternalClockFeed {
    shared: Arc<FeedShared>,
}

impl ExternalClockFeed {
    /// Forward `event` to the transport. Returns `false` if the clock is not
    /// started.
    pub fn send(&self, event: ClockEvent) -> bool {
        match self.shared.sink.lock().as_ref() {
            Some(sink) => sink.send(event),
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.sink.lock().is_some()
    }

    pub fn start(&self) -> bool {
        self.send(ClockEvent::Start)
    }

    pub fn tick(&self) -> bool {
        self.send(ClockEvent::Tick)
    }

    /// Send `count` ticks.
    pub fn ticks(&self, count: usize) -> bool {
        (0..count).all(|_| self.tick())
    }

    pub fn stop(&self) -> bool {
        self.send(ClockEvent::Stop)
    }
}

impl Clone for ExternalClockFeed {
    fn clone(&self) -> Self {
        self.shared.feeds.fetch_add(1, Ordering::AcqRel);
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for ExternalClockFeed {
    fn drop(&mut self) {
        let sink = self.shared.sink.lock();
        if self.shared.feeds.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        if let Some(sink) = sink.as_ref() {
            tracing::warn!("Last feed of an external clock dropped while connected");
            sink.disconnect();
        }
    }
}
