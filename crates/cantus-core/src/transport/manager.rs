//! Transport loop: drives the sequencer from a clock.

use super::clock::{Clock, ClockEvent, ClockSink, TransportMessage};
use super::fsm::{TransitionResult, TransportEvent, TransportFsm, TransportState};
use super::handle::{TransportHandle, TransportShared};
use super::sync::ClockStatus;
use crate::sequencer::{panic_message, ActionOutcome, Sequencer};
use crate::{BoxError, CantusConfig, Error, Position, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

type Hook<C> = Box<dyn FnMut(&mut Sequencer<C>) -> core::result::Result<(), BoxError> + Send>;

/// Lifecycle phase a hook is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    BeforeBegin,
    OnStart,
    AfterStop,
}

impl HookPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPhase::BeforeBegin => "before_begin",
            HookPhase::OnStart => "on_start",
            HookPhase::AfterStop => "after_stop",
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

/// Owns a clock and a [`Sequencer`], converting clock ticks into positions.
///
/// `start` blocks the calling thread until the transport is stopped, either
/// through a [`TransportHandle`], from an action via
/// [`Sequencer::stop_transport`], or by the clock sending `Stop`. A clock
/// whose producer goes away ends the run with [`Error::ClockDisconnected`].
///
/// # Example
/// ```ignore
/// let mut transport = Transport::new(Box::new(clock), voices, CantusConfig::default())?;
/// transport.after_stop(|seq| seq.context_mut().panic());
/// transport.sequencer_mut().at(1, |seq| { ... })?;
/// transport.start()?;
/// ```
pub struct Transport<C = ()> {
    clock: Box<dyn Clock>,
    sequencer: Sequencer<C>,
    fsm: TransportFsm,
    before_begin: Vec<Hook<C>>,
    on_start: Vec<Hook<C>>,
    after_stop: Vec<Hook<C>>,
    shared: Arc<TransportShared>,
    sender: Sender<TransportMessage>,
    receiver: Receiver<TransportMessage>,
    /// Ticks received in the current run.
    ticks: u64,
}

impl<C: 'static> Transport<C> {
    pub fn new(clock: Box<dyn Clock>, context: C, config: CantusConfig) -> Result<Self> {
        Self::with_sequencer(clock, Sequencer::with_config(context, config))
    }

    pub fn with_sequencer(clock: Box<dyn Clock>, sequencer: Sequencer<C>) -> Result<Self> {
        sequencer.config().validate()?;
        let (sender, receiver) = unbounded();
        let shared = Arc::new(TransportShared::new(sequencer.config().ticks_per_beat));
        Ok(Self {
            clock,
            sequencer,
            fsm: TransportFsm::new(),
            before_begin: Vec::new(),
            on_start: Vec::new(),
            after_stop: Vec::new(),
            shared,
            sender,
            receiver,
            ticks: 0,
        })
    }

    pub fn sequencer(&self) -> &Sequencer<C> {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer<C> {
        &mut self.sequencer
    }

    pub fn into_sequencer(self) -> Sequencer<C> {
        self.sequencer
    }

    pub fn handle(&self) -> TransportHandle {
        TransportHandle::new(Arc::clone(&self.shared), self.sender.clone())
    }

    pub fn state(&self) -> TransportState {
        self.fsm.state()
    }

    pub fn clock_name(&self) -> &str {
        self.clock.name()
    }

    /// Position derived from the ticks received in the current (or last) run.
    pub fn position(&self) -> Position {
        Position::from_ticks(self.ticks, self.shared.ticks_per_beat)
    }

    /// Run `hook` at the beginning of every `start`, before the clock starts.
    pub fn before_begin<F, O>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.before_begin.push(into_hook(hook));
        self
    }

    /// Run `hook` when the clock starts running, before any action.
    pub fn on_start<F, O>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.on_start.push(into_hook(hook));
        self
    }

    /// Run `hook` once per stop, after pending actions are discarded.
    pub fn after_stop<F, O>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.after_stop.push(into_hook(hook));
        self
    }

    /// Run the transport until it is stopped.
    ///
    /// `after_stop` hooks run before this returns, whether the run ended
    /// normally or with an error.
    pub fn start(&mut self) -> Result<()> {
        if self.fsm.state() != TransportState::Stopped {
            return Err(Error::AlreadyRunning);
        }

        while self.receiver.try_recv().is_ok() {}
        self.shared.stop_requested.set(false);
        self.shared.sync.reset();
        self.set_ticks(0);

        tracing::info!("Transport starting with clock '{}'", self.clock.name());
        let result = self.run();
        if let Err(ref e) = result {
            tracing::error!("Transport run failed: {}", e);
        }
        self.shutdown();
        result
    }

    /// Stop a transport that is not blocked in `start`. While running, use a
    /// [`TransportHandle`] or [`Sequencer::stop_transport`].
    pub fn stop(&mut self) {
        if self.fsm.state() != TransportState::Stopped {
            self.shutdown();
        }
    }

    fn run(&mut self) -> Result<()> {
        run_hooks(
            HookPhase::BeforeBegin,
            &mut self.before_begin,
            &mut self.sequencer,
        )?;

        self.sequencer.rewind();
        self.fsm.transition(TransportEvent::Arm);
        self.publish_state();
        self.clock.start(ClockSink::new(self.sender.clone()))?;

        let stall_timeout = self.sequencer.config().stall_timeout;
        loop {
            if self.shared.stop_requested.take() || self.sequencer.take_stop_request() {
                return Ok(());
            }

            match self.receiver.recv_timeout(stall_timeout) {
                Ok(TransportMessage::StopRequested) => continue,
                Ok(TransportMessage::ClockLost) => return Err(Error::ClockDisconnected),
                Ok(TransportMessage::Clock(event)) => {
                    if let Flow::Stop = self.handle_clock(event)? {
                        tracing::debug!("Clock '{}' sent stop", self.clock.name());
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.shared.sync.status() != ClockStatus::Stalled {
                        tracing::warn!(
                            "No message from clock '{}' for {:?}",
                            self.clock.name(),
                            stall_timeout
                        );
                    }
                    self.shared.sync.mark_stalled();
                }
                Err(RecvTimeoutError::Disconnected) => return Err(Error::ClockDisconnected),
            }
        }
    }

    fn handle_clock(&mut self, event: ClockEvent) -> Result<Flow> {
        match event {
            ClockEvent::Start | ClockEvent::Continue => self.enter_running()?,
            ClockEvent::Stop => return Ok(Flow::Stop),
            ClockEvent::Tick => {
                self.enter_running()?;
                self.advance_ticks(self.ticks + 1);
            }
            ClockEvent::TickAt(count) => {
                self.enter_running()?;
                if count < self.ticks {
                    self.reject_backward(count);
                } else if count > self.ticks {
                    self.advance_ticks(count);
                }
            }
            ClockEvent::SongPosition(sixteenths) => {
                // Rounds down when ticks_per_beat is not a multiple of 4.
                let target = u64::from(sixteenths) * u64::from(self.shared.ticks_per_beat) / 4;
                match self.fsm.state() {
                    TransportState::Armed => {
                        self.set_ticks(target);
                        tracing::debug!("Located to {}", self.position());
                    }
                    TransportState::Running if target < self.ticks => self.reject_backward(target),
                    TransportState::Running if target > self.ticks => self.advance_ticks(target),
                    _ => {}
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn enter_running(&mut self) -> Result<()> {
        if self.fsm.transition(TransportEvent::Run) != TransitionResult::Started {
            return Ok(());
        }
        self.publish_state();
        tracing::info!("Transport running from {}", self.position());

        run_hooks(HookPhase::OnStart, &mut self.on_start, &mut self.sequencer)?;
        let position = self.position();
        self.sequencer.advance_to(position);
        Ok(())
    }

    fn advance_ticks(&mut self, ticks: u64) {
        if self.shared.sync.mark_locked() == ClockStatus::Stalled {
            tracing::info!("Clock '{}' recovered", self.clock.name());
        }
        self.set_ticks(ticks);
        let position = self.position();
        self.sequencer.advance_to(position);
    }

    fn reject_backward(&mut self, ticks: u64) {
        self.shared.sync.mark_backward();
        tracing::warn!(
            "Rejected backward clock position {} (at {})",
            Position::from_ticks(ticks, self.shared.ticks_per_beat),
            self.position()
        );
    }

    fn set_ticks(&mut self, ticks: u64) {
        self.ticks = ticks;
        self.shared.ticks.store(ticks, Ordering::Release);
    }

    fn publish_state(&self) {
        self.shared.state.set(self.fsm.state());
    }

    fn shutdown(&mut self) {
        self.clock.stop();
        let discarded = self.sequencer.clear();
        self.fsm.transition(TransportEvent::Stop);
        self.publish_state();

        // Errors are already logged per hook.
        let _ = run_hooks(HookPhase::AfterStop, &mut self.after_stop, &mut self.sequencer);

        let stopped_at = self.position();
        self.sequencer.rewind();
        self.sequencer.take_stop_request();
        self.shared.stop_requested.set(false);
        tracing::info!(
            "Transport stopped at {} ({} pending actions discarded)",
            stopped_at,
            discarded
        );
    }
}

fn into_hook<C, F, O>(mut hook: F) -> Hook<C>
where
    F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
    O: ActionOutcome,
{
    Box::new(move |seq: &mut Sequencer<C>| hook(seq).into_result())
}

/// Run hooks in registration order. `before_begin` and `on_start` stop at
/// the first failure; `after_stop` always runs every hook.
fn run_hooks<C: 'static>(
    phase: HookPhase,
    hooks: &mut [Hook<C>],
    seq: &mut Sequencer<C>,
) -> Result<()> {
    let mut first_error = None;
    for (index, hook) in hooks.iter_mut().enumerate() {
        let message = match panic::catch_unwind(AssertUnwindSafe(|| hook(seq))) {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(&*payload)),
        };
        tracing::error!("{} hook #{} failed: {}", phase.as_str(), index, message);

        let error = Error::Hook {
            phase: phase.as_str(),
            message,
        };
        if phase != HookPhase::AfterStop {
            return Err(error);
        }
        first_error.get_or_insert(error);
    }
    first_error.map_or(Ok(()), Err)
}
