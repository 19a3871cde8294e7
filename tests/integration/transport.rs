//! Transport integration tests
//!
//! Lifecycle hooks, clock message handling and the different ways a run
//! can end.

use crate::helpers::*;
use cantus::prelude::*;
use cantus::{ClockEvent, TransportState};
use std::thread;
use std::time::{Duration, Instant};

/// Hooks wrap the actions of a run in a fixed order.
#[test]
fn test_lifecycle_hook_order() {
    let mut engine = scripted_engine(Log::new(), beats(2));
    engine
        .before_begin(|seq: &mut Sequencer<Log>| mark(seq, "before_begin"))
        .on_start(|seq: &mut Sequencer<Log>| mark(seq, "on_start"))
        .after_stop(|seq: &mut Sequencer<Log>| mark(seq, "after_stop"));
    engine
        .sequencer_mut()
        .at(1, |seq: &mut Sequencer<Log>| mark(seq, "action"))
        .unwrap();

    engine.start().unwrap();
    assert_eq!(
        labels(engine.context()),
        vec!["before_begin", "on_start", "action", "after_stop"]
    );
    assert_eq!(engine.state(), TransportState::Stopped);
    assert!(!engine.handle().is_running());
}

/// An action can stop the transport; later actions never run and
/// `after_stop` sees an empty queue.
#[test]
fn test_stop_from_action() {
    let mut engine = scripted_engine(Log::new(), beats(16));
    engine.after_stop(|seq: &mut Sequencer<Log>| {
        let label = if seq.pending() == 0 { "clean" } else { "dirty" };
        mark(seq, label);
    });
    let seq = engine.sequencer_mut();
    seq.at(2, |seq: &mut Sequencer<Log>| seq.stop_transport()).unwrap();
    seq.at(2, |seq: &mut Sequencer<Log>| mark(seq, "same step")).unwrap();
    seq.at(3, |seq: &mut Sequencer<Log>| mark(seq, "late")).unwrap();

    engine.start().unwrap();
    assert_eq!(labels(engine.context()), vec!["same step", "clean"]);
    assert_eq!(engine.position(), pos(2, 1));
}

/// A failing `before_begin` hook aborts the run; `after_stop` still runs.
#[test]
fn test_before_begin_failure_aborts() {
    let mut engine = scripted_engine(Log::new(), beats(2));
    engine
        .before_begin(|_: &mut Sequencer<Log>| -> cantus::core::Result<()> {
            Err(cantus::core::Error::InvalidConfig("no output".into()))
        })
        .after_stop(|seq: &mut Sequencer<Log>| mark(seq, "after_stop"));
    engine
        .sequencer_mut()
        .at(1, |seq: &mut Sequencer<Log>| mark(seq, "action"))
        .unwrap();

    let result = engine.start();
    assert!(matches!(
        result,
        Err(cantus::Error::Core(cantus::core::Error::Hook {
            phase: "before_begin",
            ..
        }))
    ));
    assert_eq!(labels(engine.context()), vec!["after_stop"]);
    assert_eq!(engine.state(), TransportState::Stopped);
}

/// Absolute tick positions that go backwards are dropped and counted.
#[test]
fn test_backward_ticks_are_rejected() {
    let events = vec![
        ClockEvent::Start,
        ClockEvent::TickAt(48),
        ClockEvent::TickAt(24),
        ClockEvent::TickAt(72),
        ClockEvent::Stop,
    ];
    let mut engine = scripted_engine(Log::new(), events);
    let seq = engine.sequencer_mut();
    seq.at(r(3, 2), |seq: &mut Sequencer<Log>| mark(seq, "one and a half")).unwrap();
    seq.at(r(5, 2), |seq: &mut Sequencer<Log>| mark(seq, "two and a half")).unwrap();

    engine.start().unwrap();
    assert_eq!(
        labels(engine.context()),
        vec!["one and a half", "two and a half"]
    );
    assert_eq!(engine.position(), pos(3, 1));
    assert_eq!(engine.handle().clock_sync().rejected(), 1);
}

/// A song position received before the clock runs locates the transport;
/// actions already behind the new position run late at their own position.
#[test]
fn test_song_position_locates_before_start() {
    let mut events = vec![ClockEvent::SongPosition(16), ClockEvent::Continue];
    events.extend(std::iter::repeat(ClockEvent::Tick).take(24));
    events.push(ClockEvent::Stop);

    let mut engine = scripted_engine(Vec::<(&'static str, Position, Position)>::new(), events);
    let seq = engine.sequencer_mut();
    for (label, at) in [("passed", 2), ("located", 4), ("ahead", 5)] {
        seq.at(at, move |seq: &mut Sequencer<Vec<(&'static str, Position, Position)>>| {
            let (position, now) = (seq.position(), seq.now());
            seq.context_mut().push((label, position, now));
        })
        .unwrap();
    }

    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![
            ("passed", pos(2, 1), pos(4, 1)),
            ("located", pos(4, 1), pos(4, 1)),
            ("ahead", pos(5, 1), pos(5, 1)),
        ]
    );
}

/// An external clock fed from another thread drives the run and ends it.
#[test]
fn test_external_clock_feed() {
    let mut engine = CantusEngine::builder()
        .external_clock("test feed")
        .build(Log::new())
        .unwrap();
    engine
        .sequencer_mut()
        .at(1, |seq: &mut Sequencer<Log>| mark(seq, "fed"))
        .unwrap();

    let feed = engine.clock_feed().cloned().unwrap();
    let handle = engine.handle();
    let driver = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !feed.is_connected() {
            if Instant::now() > deadline {
                handle.stop();
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        feed.start();
        feed.ticks(48);
        feed.stop();
    });

    engine.start().unwrap();
    driver.join().unwrap();
    assert_eq!(engine.context(), &vec![("fed", pos(1, 1))]);
    assert_eq!(engine.position(), pos(2, 1));
}

/// Losing the only clock feed mid-run stops the engine with an error.
#[test]
fn test_dropped_feed_stops_with_disconnect() {
    let mut engine = CantusEngine::builder()
        .external_clock("flaky")
        .build(Log::new())
        .unwrap();
    engine.after_stop(|seq: &mut Sequencer<Log>| mark(seq, "after"));
    let seq = engine.sequencer_mut();
    seq.at(1, |seq: &mut Sequencer<Log>| mark(seq, "one")).unwrap();
    seq.at(4, |seq: &mut Sequencer<Log>| mark(seq, "never")).unwrap();

    let feed = engine.take_clock_feed().unwrap();
    assert!(engine.clock_feed().is_none());
    let handle = engine.handle();
    let driver = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !feed.is_connected() {
            if Instant::now() > deadline {
                handle.stop();
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        feed.start();
        feed.ticks(36);
    });

    let result = engine.start();
    driver.join().unwrap();
    assert!(matches!(
        result,
        Err(cantus::Error::Core(cantus::core::Error::ClockDisconnected))
    ));
    assert_eq!(labels(engine.context()), vec!["one", "after"]);
    assert_eq!(engine.state(), TransportState::Stopped);
}

/// The timer clock runs in real time.
#[test]
fn test_timer_clock_runs() {
    let mut engine = CantusEngine::builder()
        .bpm(960.0)
        .timer_clock()
        .build(Log::new())
        .unwrap();
    let seq = engine.sequencer_mut();
    seq.at(1, |seq: &mut Sequencer<Log>| mark(seq, "one")).unwrap();
    seq.at(2, |seq: &mut Sequencer<Log>| seq.stop_transport()).unwrap();

    let started = Instant::now();
    engine.start().unwrap();
    assert_eq!(engine.context(), &vec![("one", pos(1, 1))]);
    assert!(engine.position() >= pos(2, 1));
    // Two beats at 960 BPM take 125 ms.
    assert!(started.elapsed() >= Duration::from_millis(100));
}

/// A handle can stop the transport from another thread.
#[test]
fn test_stop_from_handle() {
    let mut engine = CantusEngine::builder()
        .bpm(240.0)
        .build(Log::new())
        .unwrap();
    let handle = engine.handle();
    engine
        .sequencer_mut()
        .at(1000, |seq: &mut Sequencer<Log>| mark(seq, "never"))
        .unwrap();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle.stop();
    });
    engine.start().unwrap();
    stopper.join().unwrap();
    assert!(engine.context().is_empty());
    assert_eq!(engine.state(), TransportState::Stopped);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(matches!(
        CantusEngine::builder().bpm(5000.0).build(()),
        Err(cantus::Error::Core(_))
    ));
    assert!(matches!(
        CantusEngine::builder().ticks_per_beat(0).build(()),
        Err(cantus::Error::Core(_))
    ));
}
