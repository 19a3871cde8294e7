//! Sequencer integration tests
//!
//! Scheduling driven by a scripted clock through the full engine.

use crate::helpers::*;
use cantus::prelude::*;
use proptest::prelude::*;

/// Actions run at their positions; anything beyond the end is discarded.
#[test]
fn test_actions_run_in_position_order() {
    let mut engine = scripted_engine(Log::new(), beats(4));
    let seq = engine.sequencer_mut();
    seq.at(r(3, 2), |seq: &mut Sequencer<Log>| mark(seq, "half")).unwrap();
    seq.at(1, |seq: &mut Sequencer<Log>| mark(seq, "one")).unwrap();
    seq.at(0, |seq: &mut Sequencer<Log>| mark(seq, "zero")).unwrap();
    seq.at(5, |seq: &mut Sequencer<Log>| mark(seq, "never")).unwrap();

    engine.start().unwrap();

    assert_eq!(
        engine.context(),
        &vec![("zero", pos(0, 1)), ("one", pos(1, 1)), ("half", pos(3, 2))]
    );
    assert_eq!(engine.position(), pos(4, 1));
    assert_eq!(engine.sequencer().pending(), 0);
}

/// Equal positions keep scheduling order.
#[test]
fn test_same_position_is_fifo() {
    let mut engine = scripted_engine(Log::new(), beats(2));
    let seq = engine.sequencer_mut();
    for label in ["a", "b", "c", "d"] {
        seq.at(1, move |seq: &mut Sequencer<Log>| mark(seq, label)).unwrap();
    }

    engine.start().unwrap();
    assert_eq!(labels(engine.context()), vec!["a", "b", "c", "d"]);
}

/// `wait` is relative to the logical position, not to the tick that ran
/// the action, so durations that do not land on a tick stay exact.
#[test]
fn test_wait_keeps_exact_rational_positions() {
    let mut engine = scripted_engine(Log::new(), beats(3));
    engine
        .sequencer_mut()
        .at(1, |seq: &mut Sequencer<Log>| -> cantus::core::Result<()> {
            seq.wait(r(1, 5), |seq: &mut Sequencer<Log>| -> cantus::core::Result<()> {
                mark(seq, "fifth");
                assert!(seq.now() >= seq.position());
                seq.wait(r(1, 5), |seq: &mut Sequencer<Log>| mark(seq, "two fifths"))?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![("fifth", pos(6, 5)), ("two fifths", pos(7, 5))]
    );
}

/// A repeating action cancelled from inside its own body fires its `after`
/// continuation at the cancelling position.
#[test]
fn test_every_cancelled_from_inside() {
    let mut engine = scripted_engine(Log::new(), beats(8));
    engine
        .sequencer_mut()
        .at(1, |seq: &mut Sequencer<Log>| -> cantus::core::Result<()> {
            let control = seq.every(1, |seq: &mut Sequencer<Log>| {
                mark(seq, "tick");
                if seq.context().len() == 3 {
                    if let Some(control) = seq.current_control() {
                        control.cancel();
                    }
                }
            })?;
            control.after(|seq: &mut Sequencer<Log>| mark(seq, "done"));
            Ok(())
        })
        .unwrap();

    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![
            ("tick", pos(1, 1)),
            ("tick", pos(2, 1)),
            ("tick", pos(3, 1)),
            ("done", pos(3, 1)),
        ]
    );
}

/// Continuations chain: the second `after_delay` is counted from the end
/// of the first action.
#[test]
fn test_after_delay_chains_from_termination() {
    let mut engine = scripted_engine(Log::new(), beats(4));
    let seq = engine.sequencer_mut();
    let first = seq.at(1, |seq: &mut Sequencer<Log>| mark(seq, "first")).unwrap();
    first
        .after_delay(r(1, 2), |seq: &mut Sequencer<Log>| mark(seq, "second"))
        .unwrap();

    let cancelled = seq.at(2, |seq: &mut Sequencer<Log>| mark(seq, "cancelled")).unwrap();
    cancelled.after(|seq: &mut Sequencer<Log>| mark(seq, "after cancel"));
    assert!(cancelled.cancel());
    assert!(!cancelled.cancel());

    engine.start().unwrap();
    assert_eq!(
        labels(engine.context()),
        vec!["after cancel", "first", "second"]
    );
    assert_eq!(engine.context()[2].1, pos(3, 2));
}

fn explode(_: &mut Sequencer<Log>) -> cantus::core::Result<()> {
    panic!("action exploded")
}

/// Failing and panicking actions are reported and do not stop the run.
#[test]
fn test_failures_do_not_stop_the_run() {
    let mut engine = scripted_engine(Log::new(), beats(4));
    let seq = engine.sequencer_mut();
    seq.at(1, |_: &mut Sequencer<Log>| -> cantus::core::Result<()> {
        Err(cantus::core::Error::InvalidDuration("broken".into()))
    })
    .unwrap();
    seq.at(2, explode).unwrap();
    seq.at(3, |seq: &mut Sequencer<Log>| mark(seq, "survived")).unwrap();

    engine.start().unwrap();
    assert_eq!(engine.context(), &vec![("survived", pos(3, 1))]);
}

/// Stopping discards pending actions and rewinds, so the engine can be
/// started again from zero.
#[test]
fn test_restart_after_stop() {
    let mut engine = scripted_engine(Log::new(), beats(2));
    engine
        .sequencer_mut()
        .at(1, |seq: &mut Sequencer<Log>| mark(seq, "first run"))
        .unwrap();
    engine
        .sequencer_mut()
        .at(3, |seq: &mut Sequencer<Log>| mark(seq, "discarded"))
        .unwrap();
    engine.start().unwrap();
    assert_eq!(engine.sequencer().pending(), 0);
    assert_eq!(engine.sequencer().position(), Position::zero());

    engine
        .sequencer_mut()
        .at(0, |seq: &mut Sequencer<Log>| mark(seq, "second run"))
        .unwrap();
    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![("first run", pos(1, 1)), ("second run", pos(0, 1))]
    );
}

#[test]
fn test_negative_arguments_are_rejected() {
    let mut engine = scripted_engine(Log::new(), Vec::new());
    let seq = engine.sequencer_mut();
    assert!(seq.at(-1, |_: &mut Sequencer<Log>| {}).is_err());
    assert!(seq.wait(r(-1, 2), |_: &mut Sequencer<Log>| {}).is_err());
    assert!(seq.every(0, |_: &mut Sequencer<Log>| {}).is_err());
    assert_eq!(seq.pending(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever order actions are registered in, a run executes them sorted
    /// by position, ties in registration order, each at its own position.
    #[test]
    fn scheduled_actions_run_sorted(
        slots in prop::collection::vec((0i64..32, 1i64..5), 1..24),
    ) {
        let mut engine = scripted_engine(Vec::<(usize, Position)>::new(), beats(8));
        let seq = engine.sequencer_mut();
        let mut expected = Vec::new();
        for (index, &(n, d)) in slots.iter().enumerate() {
            let at = pos(n, d);
            seq.at(r(n, d), move |seq: &mut Sequencer<Vec<(usize, Position)>>| {
                let now = seq.position();
                seq.context_mut().push((index, now));
            })
            .unwrap();
            if at <= pos(8, 1) {
                expected.push((at, index));
            }
        }
        expected.sort();

        engine.start().unwrap();
        let ran: Vec<(Position, usize)> =
            engine.context().iter().map(|&(index, at)| (at, index)).collect();
        prop_assert_eq!(ran, expected);
    }
}
