//! Pending-action queue shared between the sequencer and its controls.

use super::control::ControlId;
use super::Sequencer;
use crate::{BoxError, Position};
use std::collections::BTreeMap;

pub(crate) type Action<C> = Box<dyn FnOnce(&mut Sequencer<C>) -> Result<(), BoxError> + Send>;

pub(crate) struct Entry<C> {
    pub(crate) owner: Option<ControlId>,
    pub(crate) action: Action<C>,
}

/// Actions keyed by (position, registration order).
pub(crate) struct ActionQueue<C> {
    entries: BTreeMap<(Position, u64), Entry<C>>,
    next_seq: u64,
    /// Furthest position the transport has advanced to.
    now: Position,
    /// Position of the action currently executing, if any.
    current: Option<Position>,
}

impl<C> ActionQueue<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
            now: Position::zero(),
            current: None,
        }
    }

    #[inline]
    pub(crate) fn now(&self) -> Position {
        self.now
    }

    /// Logical position: the running action's position during an advance
    /// step, otherwise the advance head.
    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.current.unwrap_or(self.now)
    }

    /// Insert an action. Positions before the logical position are moved up
    /// to it, so nothing is ever scheduled into the past.
    pub(crate) fn push(
        &mut self,
        at: Position,
        owner: Option<ControlId>,
        action: Action<C>,
    ) -> Position {
        let at = at.max(self.position());
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((at, seq), Entry { owner, action });
        at
    }

    /// Move the advance head forward. Returns `false` for a backward move,
    /// which is ignored.
    pub(crate) fn advance(&mut self, to: Position) -> bool {
        if to < self.now {
            return false;
        }
        self.now = to;
        true
    }

    /// Remove the earliest action due at or before the advance head.
    pub(crate) fn pop_due(&mut self) -> Option<(Position, Entry<C>)> {
        let (&(at, _), _) = self.entries.first_key_value()?;
        if at > self.now {
            return None;
        }
        let ((at, _), entry) = self.entries.pop_first()?;
        self.current = Some(at);
        Some((at, entry))
    }

    pub(crate) fn finish_step(&mut self) {
        self.current = None;
    }

    pub(crate) fn remove_owned(&mut self, owner: ControlId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.owner != Some(owner));
        before - self.entries.len()
    }

    pub(crate) fn clear(&mut self) -> usize {
        let discarded = self.entries.len();
        self.entries.clear();
        discarded
    }

    /// Rewind to zero, keeping pending entries.
    pub(crate) fn rewind(&mut self) {
        self.now = Position::zero();
        self.current = None;
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn next_due(&self) -> Option<Position> {
        self.entries.keys().next().map(|&(at, _)| at)
    }
}
