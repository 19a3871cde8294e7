#![allow(dead_code)]

//! Test helpers and fixtures for cantus integration tests
//!
//! [`ScriptedClock`] replays a fixed list of clock events the moment the
//! transport starts it, so a whole run completes inside `start()` without
//! any real time passing.

use cantus::prelude::*;
use cantus::{Clock, ClockEvent};
use cantus::core::ClockSink;

/// Ticks per beat used by the default configuration.
pub const TPB: u64 = 24;

/// Clock that sends a fixed script on start.
pub struct ScriptedClock {
    script: Vec<ClockEvent>,
}

impl ScriptedClock {
    pub fn boxed(script: Vec<ClockEvent>) -> Box<dyn Clock> {
        Box::new(Self { script })
    }
}

impl Clock for ScriptedClock {
    fn start(&mut self, sink: ClockSink) -> cantus::core::Result<()> {
        for event in &self.script {
            sink.send(*event);
        }
        Ok(())
    }

    fn stop(&mut self) {}

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Start, `ticks` ticks, stop.
pub fn script(ticks: usize) -> Vec<ClockEvent> {
    let mut events = vec![ClockEvent::Start];
    events.extend(std::iter::repeat(ClockEvent::Tick).take(ticks));
    events.push(ClockEvent::Stop);
    events
}

/// Script running for `beats` whole beats.
pub fn beats(beats: usize) -> Vec<ClockEvent> {
    script(beats * TPB as usize)
}

/// Engine around `context`, driven by `events`.
pub fn scripted_engine<C: 'static>(context: C, events: Vec<ClockEvent>) -> CantusEngine<C> {
    CantusEngine::builder()
        .clock(ScriptedClock::boxed(events))
        .build(context)
        .expect("Failed to create test engine")
}

pub fn pos(numer: i64, denom: i64) -> Position {
    Position::from_beats(r(numer, denom))
}

/// Context recording `(label, position)` pairs.
pub type Log = Vec<(&'static str, Position)>;

/// Push `label` at the current position.
pub fn mark(seq: &mut Sequencer<Log>, label: &'static str) {
    let at = seq.position();
    seq.context_mut().push((label, at));
}

pub fn labels(log: &Log) -> Vec<&'static str> {
    log.iter().map(|(label, _)| *label).collect()
}
