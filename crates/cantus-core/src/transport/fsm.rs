//! Transport state machine.

use crate::lockfree::AtomicRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TransportState {
    #[default]
    Stopped = 0,
    /// Clock started, waiting for its first start message or tick.
    Armed = 1,
    Running = 2,
}

impl AtomicRepr for TransportState {
    fn to_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => TransportState::Armed,
            2 => TransportState::Running,
            _ => TransportState::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Arm,
    Run,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    None,
    StateChanged(TransportState),
    /// Entered `Running`; `on_start` hooks are due.
    Started,
}

#[derive(Debug, Default)]
pub struct TransportFsm {
    state: TransportState,
}

impl TransportFsm {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn transition(&mut self, event: TransportEvent) -> TransitionResult {
        use TransportEvent::*;

        match (event, self.state) {
            (Arm, TransportState::Stopped) => {
                self.state = TransportState::Armed;
                TransitionResult::StateChanged(TransportState::Armed)
            }
            (Arm, _) => TransitionResult::None,

            (Run, TransportState::Armed) => {
                self.state = TransportState::Running;
                TransitionResult::Started
            }
            (Run, _) => TransitionResult::None,

            (Stop, TransportState::Stopped) => TransitionResult::None,
            (Stop, _) => {
                self.state = TransportState::Stopped;
                TransitionResult::StateChanged(TransportState::Stopped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut fsm = TransportFsm::new();
        assert_eq!(fsm.state(), TransportState::Stopped);

        assert_eq!(
            fsm.transition(TransportEvent::Arm),
            TransitionResult::StateChanged(TransportState::Armed)
        );
        assert_eq!(fsm.transition(TransportEvent::Run), TransitionResult::Started);
        assert_eq!(fsm.state(), TransportState::Running);
        assert_eq!(
            fsm.transition(TransportEvent::Stop),
            TransitionResult::StateChanged(TransportState::Stopped)
        );
    }

    #[test]
    fn test_run_requires_arm() {
        let mut fsm = TransportFsm::new();
        assert_eq!(fsm.transition(TransportEvent::Run), TransitionResult::None);
        assert_eq!(fsm.state(), TransportState::Stopped);
    }

    #[test]
    fn test_redundant_events_are_ignored() {
        let mut fsm = TransportFsm::new();
        fsm.transition(TransportEvent::Arm);
        fsm.transition(TransportEvent::Run);
        assert_eq!(fsm.transition(TransportEvent::Arm), TransitionResult::None);
        assert_eq!(fsm.transition(TransportEvent::Run), TransitionResult::None);
        fsm.transition(TransportEvent::Stop);
        assert_eq!(fsm.transition(TransportEvent::Stop), TransitionResult::None);
    }

    #[test]
    fn test_rearm_starts_again() {
        let mut fsm = TransportFsm::new();
        fsm.transition(TransportEvent::Arm);
        fsm.transition(TransportEvent::Run);
        fsm.transition(TransportEvent::Stop);
        fsm.transition(TransportEvent::Arm);
        assert_eq!(fsm.transition(TransportEvent::Run), TransitionResult::Started);
    }
}
