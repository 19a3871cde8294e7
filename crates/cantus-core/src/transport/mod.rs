//! Clocks, the transport state machine and the transport loop.

mod clock;
mod fsm;
mod handle;
mod manager;
mod sync;

pub use clock::{
    Clock, ClockEvent, ClockSink, ExternalClock, ExternalClockFeed, TimerClock, TransportMessage,
};
pub use fsm::{TransitionResult, TransportEvent, TransportFsm, TransportState};
pub use handle::TransportHandle;
pub use manager::{HookPhase, Transport};
pub use sync::{ClockStatus, ClockSync};
