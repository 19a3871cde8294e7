//! Cooperative scheduler running actions at exact rational positions.
//!
//! The [`Sequencer`] keeps pending actions ordered by position and then by
//! registration order. Each [`advance_to`](Sequencer::advance_to) runs every
//! action that has become due, including actions that earlier actions
//! schedule at or before the new position. Every action receives the
//! sequencer itself, so it can schedule follow-up work, launch events and
//! reach the composition context.

mod control;
mod events;
mod play;
mod queue;

pub use control::{Control, ControlId};
pub use events::EventArgs;
pub use play::{HasDuration, TimedEvent, TimedValue};

use crate::position::IntoBeats;
use crate::{BoxError, CantusConfig, Error, Position, Result, BBT};
use cantus_series::Rational;
use events::EventRegistry;
use num_traits::Zero;
use parking_lot::Mutex;
use queue::{Action, ActionQueue};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What an action, callback or hook may return: `()` or a `Result` whose
/// error converts into [`BoxError`].
pub trait ActionOutcome {
    fn into_result(self) -> core::result::Result<(), BoxError>;
}

impl ActionOutcome for () {
    #[inline]
    fn into_result(self) -> core::result::Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> ActionOutcome for core::result::Result<(), E> {
    #[inline]
    fn into_result(self) -> core::result::Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

pub(crate) fn into_action<C, F, O>(f: F) -> Action<C>
where
    F: FnOnce(&mut Sequencer<C>) -> O + Send + 'static,
    O: ActionOutcome,
{
    Box::new(move |seq: &mut Sequencer<C>| f(seq).into_result())
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Summary of one [`Sequencer::advance_to`] step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Actions run, including failed ones.
    pub executed: usize,
    /// Actions that returned an error or panicked.
    pub failed: usize,
}

impl AdvanceReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl core::ops::AddAssign for AdvanceReport {
    fn add_assign(&mut self, other: Self) {
        self.executed += other.executed;
        self.failed += other.failed;
    }
}

/// Scheduler owning a composition context `C`.
pub struct Sequencer<C = ()> {
    queue: Arc<Mutex<ActionQueue<C>>>,
    events: EventRegistry<C>,
    context: C,
    config: CantusConfig,
    stop_requested: bool,
    running_control: Option<Control<C>>,
}

impl<C: 'static> Sequencer<C> {
    pub fn new(context: C) -> Self {
        Self::with_config(context, CantusConfig::default())
    }

    pub fn with_config(context: C, config: CantusConfig) -> Self {
        Self {
            queue: Arc::new(Mutex::new(ActionQueue::new())),
            events: EventRegistry::new(),
            context,
            config,
            stop_requested: false,
            running_control: None,
        }
    }

    pub fn config(&self) -> &CantusConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Current logical position. Inside an action this is the position the
    /// action was scheduled at.
    pub fn position(&self) -> Position {
        self.queue.lock().position()
    }

    /// Furthest position the clock has advanced to. Equal to
    /// [`position`](Self::position) except while a late action runs.
    pub fn now(&self) -> Position {
        self.queue.lock().now()
    }

    pub fn bbt(&self) -> BBT {
        self.position()
            .to_bbt(self.config.beats_per_bar, self.config.ticks_per_beat)
    }

    /// Number of pending actions.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Position of the earliest pending action.
    pub fn next_due(&self) -> Option<Position> {
        self.queue.lock().next_due()
    }

    /// Discard every pending action. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        self.queue.lock().clear()
    }

    /// Control of the action or playback currently running, if any.
    pub fn current_control(&self) -> Option<Control<C>> {
        self.running_control.clone()
    }

    /// Run `action` once the position reaches `position`. A position that has
    /// already passed runs at the next advance.
    pub fn at<P, F, O>(&mut self, position: P, action: F) -> Result<Control<C>>
    where
        P: IntoBeats,
        F: FnOnce(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let position = Position::from_beats(position.into_beats());
        if position.is_negative() {
            return Err(Error::InvalidPosition(position.to_string()));
        }
        Ok(self.schedule_once(position, action))
    }

    /// Run `action` `delay` beats after the current position.
    pub fn wait<D, F, O>(&mut self, delay: D, action: F) -> Result<Control<C>>
    where
        D: IntoBeats,
        F: FnOnce(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let delay = delay.into_beats();
        if delay < Rational::zero() {
            return Err(Error::InvalidDuration(format!(
                "wait delay {} must be non-negative",
                delay
            )));
        }
        let position = self.position() + delay;
        Ok(self.schedule_once(position, action))
    }

    /// Run `action` now and then every `interval` beats until the returned
    /// control is cancelled.
    pub fn every<D, F, O>(&mut self, interval: D, action: F) -> Result<Control<C>>
    where
        D: IntoBeats,
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let interval = interval.into_beats();
        if interval <= Rational::zero() {
            return Err(Error::InvalidDuration(format!(
                "every interval {} must be positive",
                interval
            )));
        }
        let control = self.new_control();
        let start = self.position();
        schedule_every(self, control.clone(), start, interval, action);
        Ok(control)
    }

    /// Advance to `position` and run everything that has become due.
    ///
    /// Driven by the transport on every tick. A position behind the current
    /// one is ignored.
    pub fn advance_to(&mut self, position: Position) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        {
            let mut queue = self.queue.lock();
            if !queue.advance(position) {
                tracing::warn!(
                    "Ignoring backward advance from {} to {}",
                    queue.now(),
                    position
                );
                return report;
            }
        }

        loop {
            let next = self.queue.lock().pop_due();
            let Some((at, entry)) = next else {
                break;
            };
            if self.config.log_events {
                tracing::debug!(
                    "Running action at {} ({})",
                    at,
                    at.to_bbt(self.config.beats_per_bar, self.config.ticks_per_beat)
                );
            }

            report.executed += 1;
            let action = entry.action;
            match panic::catch_unwind(AssertUnwindSafe(|| action(self))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    report.failed += 1;
                    tracing::error!("Action at {} failed: {}", at, error);
                }
                Err(payload) => {
                    report.failed += 1;
                    tracing::error!("Action at {} panicked: {}", at, panic_message(&*payload));
                }
            }
        }

        self.queue.lock().finish_step();
        report
    }

    /// Ask the owning transport to stop once the current advance step
    /// completes.
    pub fn stop_transport(&mut self) {
        tracing::info!("Transport stop requested at {}", self.position());
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub(crate) fn take_stop_request(&mut self) -> bool {
        std::mem::take(&mut self.stop_requested)
    }

    pub(crate) fn rewind(&mut self) {
        self.queue.lock().rewind();
    }

    pub(crate) fn new_control(&self) -> Control<C> {
        Control::new(Arc::clone(&self.queue))
    }

    pub(crate) fn schedule(
        &self,
        at: Position,
        owner: Option<ControlId>,
        action: Action<C>,
    ) -> Position {
        let at = self.queue.lock().push(at, owner, action);
        if self.config.log_events {
            tracing::debug!("Scheduled action at {}", at);
        }
        at
    }

    /// Run `f` with `control` reported by [`current_control`](Self::current_control).
    pub(crate) fn with_control<R>(
        &mut self,
        control: &Control<C>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = self.running_control.replace(control.clone());
        let result = f(self);
        self.running_control = previous;
        result
    }

    fn schedule_once<F, O>(&mut self, position: Position, action: F) -> Control<C>
    where
        F: FnOnce(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let control = self.new_control();
        let owner = control.clone();
        self.schedule(
            position,
            Some(control.id()),
            Box::new(move |seq: &mut Sequencer<C>| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    seq.with_control(&owner, |seq| action(seq).into_result())
                }));
                owner.terminate();
                match outcome {
                    Ok(result) => result,
                    Err(payload) => panic::resume_unwind(payload),
                }
            }),
        );
        control
    }
}

fn schedule_every<C, F, O>(
    seq: &mut Sequencer<C>,
    control: Control<C>,
    at: Position,
    interval: Rational,
    mut action: F,
) where
    C: 'static,
    F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
    O: ActionOutcome,
{
    let owner = control.id();
    seq.schedule(
        at,
        Some(owner),
        Box::new(move |seq: &mut Sequencer<C>| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                seq.with_control(&control, |seq| action(seq).into_result())
            }));
            let result = match outcome {
                Ok(result) => result,
                Err(payload) => {
                    control.terminate();
                    panic::resume_unwind(payload)
                }
            };
            if !control.is_terminated() {
                schedule_every(seq, control, at + interval, interval, action);
            }
            result
        }),
    );
}
