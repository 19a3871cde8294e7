//! Named event integration tests
//!
//! Handlers registered on the sequencer and launched from scheduled actions.

use crate::helpers::*;
use cantus::prelude::*;

/// Handlers run at the launching action's position and see its arguments.
#[test]
fn test_launch_from_actions() {
    let mut engine = scripted_engine(Vec::<(i64, Position)>::new(), beats(4));
    let seq = engine.sequencer_mut();
    seq.on("accent", |seq: &mut Sequencer<Vec<(i64, Position)>>, args: &EventArgs| {
        let level = args.get::<i64>(0).copied().unwrap_or(0);
        let at = seq.position();
        seq.context_mut().push((level, at));
    });
    for (beat, level) in [(1, 3i64), (2, 5)] {
        seq.at(beat, move |seq: &mut Sequencer<Vec<(i64, Position)>>| {
            seq.launch_with("accent", event_args![level])
        })
        .unwrap();
    }
    seq.at(r(5, 2), |seq: &mut Sequencer<Vec<(i64, Position)>>| seq.launch("accent"))
        .unwrap();

    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![(3, pos(1, 1)), (5, pos(2, 1)), (0, pos(5, 2))]
    );
}

/// An unknown event fails only the launching action.
#[test]
fn test_unknown_event_fails_the_action_only() {
    let mut engine = scripted_engine(Log::new(), beats(3));
    let seq = engine.sequencer_mut();
    seq.at(1, |seq: &mut Sequencer<Log>| -> cantus::core::Result<()> {
        seq.launch("missing")?;
        mark(seq, "unreachable");
        Ok(())
    })
    .unwrap();
    seq.at(2, |seq: &mut Sequencer<Log>| mark(seq, "still running")).unwrap();

    engine.start().unwrap();
    assert_eq!(labels(engine.context()), vec!["still running"]);
    assert!(!engine.sequencer().has_event("missing"));
}

/// A handler may schedule more work; a handler launching itself is refused.
#[test]
fn test_handler_schedules_and_cannot_reenter() {
    let mut engine = scripted_engine(Log::new(), beats(4));
    let seq = engine.sequencer_mut();
    seq.on("phrase", |seq: &mut Sequencer<Log>, _: &EventArgs| -> cantus::core::Result<()> {
        mark(seq, "phrase");
        if matches!(seq.launch("phrase"), Err(cantus::core::Error::EventBusy(_))) {
            mark(seq, "busy");
        }
        seq.wait(1, |seq: &mut Sequencer<Log>| mark(seq, "answer"))?;
        Ok(())
    });
    seq.at(1, |seq: &mut Sequencer<Log>| seq.launch("phrase")).unwrap();

    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![
            ("phrase", pos(1, 1)),
            ("busy", pos(1, 1)),
            ("answer", pos(2, 1)),
        ]
    );
}

/// Registering under an existing name replaces the handler.
#[test]
fn test_handler_replacement() {
    let mut engine = scripted_engine(Log::new(), beats(2));
    let seq = engine.sequencer_mut();
    seq.on("cue", |seq: &mut Sequencer<Log>, _: &EventArgs| mark(seq, "old"));
    seq.on("cue", |seq: &mut Sequencer<Log>, _: &EventArgs| mark(seq, "new"));
    seq.at(1, |seq: &mut Sequencer<Log>| seq.launch("cue")).unwrap();

    engine.start().unwrap();
    assert_eq!(labels(engine.context()), vec!["new"]);
}

/// A section's `after` continuation launches the next section, which starts
/// only once every element of the first has played.
#[test]
fn test_section_after_launches_next_section() {
    let mut engine = scripted_engine(Log::new(), beats(3));
    let seq = engine.sequencer_mut();
    seq.on("B", |seq: &mut Sequencer<Log>, _: &EventArgs| mark(seq, "B"));
    seq.on("A", |seq: &mut Sequencer<Log>, _: &EventArgs| -> cantus::core::Result<()> {
        let section = seq.play(s![r(1, 2), r(1, 4)], |seq: &mut Sequencer<Log>, _| {
            mark(seq, "A")
        })?;
        section.after(|seq: &mut Sequencer<Log>| seq.launch("B"));
        Ok(())
    });
    seq.at(1, |seq: &mut Sequencer<Log>| seq.launch("A")).unwrap();

    engine.start().unwrap();
    assert_eq!(
        engine.context(),
        &vec![("A", pos(1, 1)), ("A", pos(3, 2)), ("B", pos(7, 4))]
    );
}
