//! CantusEngine: a transport, its clock and the composition context.

use crate::core::{
    ActionOutcome, ExternalClockFeed, Position, Sequencer, Transport, TransportHandle,
    TransportState,
};
use crate::Result;

#[cfg(feature = "midi-io")]
use crate::midi::MidiClockInput;

/// Main entry point for a composition.
///
/// Owns the [`Transport`] (and through it the [`Sequencer`] and the
/// composition context `C`). Schedule work with
/// [`sequencer_mut`](Self::sequencer_mut), register lifecycle hooks, then
/// call [`start`](Self::start), which blocks until the transport stops.
///
/// # Example
///
/// ```ignore
/// use cantus::prelude::*;
///
/// let sink = TracingSink::new(4, 24);
/// let mut engine = CantusEngine::builder().bpm(90.0).build(MidiVoices::new(sink, 1)?)?;
///
/// engine.after_stop(|seq| seq.context().panic());
/// engine.sequencer_mut().at(4, |seq| seq.stop_transport())?;
/// engine.start()?;
/// ```
pub struct CantusEngine<C = ()> {
    transport: Transport<C>,
    feed: Option<ExternalClockFeed>,

    /// Keeps the MIDI input connected while the engine lives
    #[cfg(feature = "midi-io")]
    _midi_input: Option<MidiClockInput>,
}

impl CantusEngine<()> {
    pub fn builder() -> crate::CantusEngineBuilder {
        crate::CantusEngineBuilder::default()
    }
}

impl<C: 'static> CantusEngine<C> {
    pub(crate) fn from_parts(transport: Transport<C>, feed: Option<ExternalClockFeed>) -> Self {
        Self {
            transport,
            feed,
            #[cfg(feature = "midi-io")]
            _midi_input: None,
        }
    }

    #[cfg(feature = "midi-io")]
    pub(crate) fn with_midi_input(mut self, input: Option<MidiClockInput>) -> Self {
        self._midi_input = input;
        self
    }

    pub fn sequencer(&self) -> &Sequencer<C> {
        self.transport.sequencer()
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer<C> {
        self.transport.sequencer_mut()
    }

    pub fn context(&self) -> &C {
        self.transport.sequencer().context()
    }

    pub fn context_mut(&mut self) -> &mut C {
        self.transport.sequencer_mut().context_mut()
    }

    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    /// Get the transport (advanced use - prefer the engine methods).
    pub fn transport_mut(&mut self) -> &mut Transport<C> {
        &mut self.transport
    }

    /// Thread-safe handle for stopping the engine and reading its state.
    pub fn handle(&self) -> TransportHandle {
        self.transport.handle()
    }

    /// Feed for pushing clock events when built with an external clock.
    pub fn clock_feed(&self) -> Option<&ExternalClockFeed> {
        self.feed.as_ref()
    }

    /// Hand the feed over to its producer. Once every clone of it is
    /// dropped, a running engine stops with
    /// [`ClockDisconnected`](cantus_core::Error::ClockDisconnected).
    pub fn take_clock_feed(&mut self) -> Option<ExternalClockFeed> {
        self.feed.take()
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn position(&self) -> Position {
        self.transport.position()
    }

    pub fn before_begin<F, O>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.transport.before_begin(hook);
        self
    }

    pub fn on_start<F, O>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.transport.on_start(hook);
        self
    }

    pub fn after_stop<F, O>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut Sequencer<C>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        self.transport.after_stop(hook);
        self
    }

    /// Run until stopped. Blocks the calling thread.
    pub fn start(&mut self) -> Result<()> {
        self.transport.start()?;
        Ok(())
    }

    pub fn into_context(self) -> C {
        self.transport.into_sequencer().into_context()
    }
}
