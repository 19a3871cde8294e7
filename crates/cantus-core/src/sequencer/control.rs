//! Handles to scheduled actions and playbacks.

use super::queue::{Action, ActionQueue};
use super::{into_action, ActionOutcome, Sequencer};
use crate::position::IntoBeats;
use crate::{Error, Result};
use cantus_series::Rational;
use num_traits::Zero;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a [`Control`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub(crate) u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ControlState<C> {
    cancelled: bool,
    terminated: bool,
    afters: Vec<(Rational, Action<C>)>,
}

/// Returned by every scheduling operation.
///
/// A control terminates once its action has run, its series is exhausted,
/// or it is cancelled. On termination every `after` continuation is posted
/// to the sequencer exactly once, in registration order, at the termination
/// position plus its delay.
pub struct Control<C> {
    id: ControlId,
    state: Arc<Mutex<ControlState<C>>>,
    queue: Arc<Mutex<ActionQueue<C>>>,
}

impl<C> Clone for Control<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            state: Arc::clone(&self.state),
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<C> fmt::Debug for Control<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("cancelled", &state.cancelled)
            .field("terminated", &state.terminated)
            .field("afters", &state.afters.len())
            .finish()
    }
}

impl<C: 'static> Control<C> {
    pub(crate) fn new(queue: Arc<Mutex<ActionQueue<C>>>) -> Self {
        Self {
            id: ControlId(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed)),
            state: Arc::new(Mutex::new(ControlState {
                cancelled: false,
                terminated: false,
                afters: Vec::new(),
            })),
            queue,
        }
    }

    #[inline]
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Run `callback` when this control terminates.
    pub fn after<F, O>(&self, callback: F) -> &Self
    where
        F: FnOnce(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.post_after(Rational::zero(), into_action(callback));
        self
    }

    /// Run `callback` `delay` beats after this control terminates.
    pub fn after_delay<D, F, O>(&self, delay: D, callback: F) -> Result<&Self>
    where
        D: IntoBeats,
        F: FnOnce(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let delay = delay.into_beats();
        if delay < Rational::zero() {
            return Err(Error::InvalidDuration(format!(
                "after delay {} must be non-negative",
                delay
            )));
        }
        self.post_after(delay, into_action(callback));
        Ok(self)
    }

    /// Stop the action or playback. Pending re-scheduling is removed and the
    /// `after` chain is posted at the current position. Returns `false` if
    /// the control had already terminated.
    pub fn cancel(&self) -> bool {
        let afters = {
            let mut state = self.state.lock();
            if state.terminated {
                return false;
            }
            state.cancelled = true;
            state.terminated = true;
            std::mem::take(&mut state.afters)
        };

        let mut queue = self.queue.lock();
        let removed = queue.remove_owned(self.id);
        let at = queue.position();
        for (delay, action) in afters {
            queue.push(at + delay, None, action);
        }
        tracing::debug!(
            "Control {} cancelled at {} ({} pending removed)",
            self.id,
            at,
            removed
        );
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    /// Mark as finished and post the `after` chain. Idempotent.
    pub(crate) fn terminate(&self) -> bool {
        let afters = {
            let mut state = self.state.lock();
            if state.terminated {
                return false;
            }
            state.terminated = true;
            std::mem::take(&mut state.afters)
        };

        let mut queue = self.queue.lock();
        let at = queue.position();
        for (delay, action) in afters {
            queue.push(at + delay, None, action);
        }
        true
    }

    fn post_after(&self, delay: Rational, action: Action<C>) {
        let mut state = self.state.lock();
        if !state.terminated {
            state.afters.push((delay, action));
            return;
        }
        drop(state);

        let mut queue = self.queue.lock();
        let at = queue.position() + delay;
        queue.push(at, None, action);
    }
}
