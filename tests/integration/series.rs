//! Series playback integration tests
//!
//! Series drive voices through the sequencer; a recording sink captures the
//! resulting note edges.

use crate::helpers::*;
use cantus::midi::{NoteEdge, Result as MidiResult};
use cantus::prelude::*;

struct Band {
    voices: MidiVoices,
    scale: Scale,
}

fn band(voices: usize) -> (Band, RecordingSink) {
    let sink = RecordingSink::new();
    let band = Band {
        voices: MidiVoices::new(sink.clone(), voices).unwrap(),
        scale: Scale::major(60),
    };
    (band, sink)
}

/// Sound scale degree `degree` on voice `voice` for `duration` beats.
fn sound(
    seq: &mut Sequencer<Band>,
    voice: usize,
    degree: i64,
    duration: Rational,
) -> MidiResult<()> {
    let pitch = seq.context().scale.pitch(degree as i32);
    let voice = seq.context().voices.voice(voice)?;
    voice.note(seq, pitch, 100, duration)?;
    Ok(())
}

fn onsets_on(sink: &RecordingSink, channel: u8) -> Vec<(u8, Position)> {
    sink.edges()
        .into_iter()
        .filter_map(|edge| match edge {
            NoteEdge::On {
                channel: c,
                pitch,
                at,
                ..
            } if c == channel => Some((pitch, at)),
            _ => None,
        })
        .collect()
}

/// A record series plays note after note, each for its own duration.
#[test]
fn test_record_melody() {
    let (context, sink) = band(1);
    let mut engine = scripted_engine(context, beats(4));

    let melody = record()
        .field("grade", s![0i64, 4, 2, 7])
        .field("duration", s![r(1, 2), r(1, 4), r(1, 4), r(1, 1)])
        .build()
        .unwrap();
    let playback = engine
        .sequencer_mut()
        .play(melody, |seq: &mut Sequencer<Band>, note: Record| {
            let duration = note.rational("duration").unwrap_or(r(1, 4));
            sound(seq, 0, note.int("grade").unwrap_or(0), duration)
        })
        .unwrap();
    playback.after(|seq: &mut Sequencer<Band>| seq.context().voices.panic());

    engine.start().unwrap();
    assert_eq!(
        sink.onsets(),
        vec![
            (60, pos(0, 1)),
            (67, pos(1, 2)),
            (64, pos(3, 4)),
            (72, pos(1, 1)),
        ]
    );
    assert!(playback.is_terminated());
    // Playback ends one duration after the last note starts.
    assert!(sink.edges().contains(&NoteEdge::AllOff { channel: 0 }));
}

/// Two cursors over one buffered random theme play the same notes, the
/// second entry two beats later.
#[test]
fn test_buffered_canon() {
    let (context, sink) = band(2);
    let mut engine = scripted_engine(context, beats(8));

    let theme = rnd_seeded(vec![0i64, 1, 2, 3, 4, 5, 6], 11)
        .unwrap()
        .max_size(8)
        .buffered();
    let leader = theme.cursor().map(|degree: i64| (degree, r(1, 2)));
    let follower = theme.cursor().map(|degree: i64| (degree, r(1, 2)));

    let seq = engine.sequencer_mut();
    seq.play(leader, |seq: &mut Sequencer<Band>, (degree, duration): (i64, Rational)| {
        sound(seq, 0, degree, duration)
    })
    .unwrap();
    seq.at(2, move |seq: &mut Sequencer<Band>| -> MidiResult<()> {
        seq.play(follower, |seq: &mut Sequencer<Band>, (degree, duration): (i64, Rational)| {
            sound(seq, 1, degree, duration)
        })?;
        Ok(())
    })
    .unwrap();

    engine.start().unwrap();
    let lead = onsets_on(&sink, 0);
    let follow = onsets_on(&sink, 1);
    assert_eq!(lead.len(), 8);
    assert_eq!(follow.len(), 8);
    for ((lead_pitch, lead_at), (follow_pitch, follow_at)) in lead.iter().zip(&follow) {
        assert_eq!(lead_pitch, follow_pitch);
        assert_eq!(follow_at.beats() - lead_at.beats(), r(2, 1));
    }
}

/// Timed values land at their offsets from the playback start, so chords
/// and overlapping notes are possible.
#[test]
fn test_play_timed_offsets() {
    let (context, sink) = band(1);
    let mut engine = scripted_engine(context, beats(4));

    let gestures = s![
        TimedValue::new(0, 0i64),
        TimedValue::new(0, 2i64),
        TimedValue::new(r(1, 3), 4i64),
        TimedValue::new(r(3, 2), 7i64),
    ];
    engine
        .sequencer_mut()
        .at(1, move |seq: &mut Sequencer<Band>| -> MidiResult<()> {
            seq.play_timed(gestures, |seq: &mut Sequencer<Band>, event: TimedEvent<i64>| {
                sound(seq, 0, event.value, r(1, 4))
            })?;
            Ok(())
        })
        .unwrap();

    engine.start().unwrap();
    assert_eq!(
        sink.onsets(),
        vec![
            (60, pos(1, 1)),
            (64, pos(1, 1)),
            (67, pos(4, 3)),
            (72, pos(5, 2)),
        ]
    );
}

/// Merged series alternate; concatenated series play one after another.
#[test]
fn test_merge_and_concat_playback() {
    let (context, sink) = band(1);
    let mut engine = scripted_engine(context, beats(4));

    let low = s![0i64, 1, 2].boxed();
    let high = s![7i64, 8].boxed();
    let woven = merge(vec![low, high]).map(|degree: i64| (degree, r(1, 4)));
    let tail = concat(vec![s![0i64], s![4i64]]).map(|degree: i64| (degree, r(1, 4)));

    let seq = engine.sequencer_mut();
    let first = seq
        .play(woven, |seq: &mut Sequencer<Band>, (degree, duration): (i64, Rational)| {
            sound(seq, 0, degree, duration)
        })
        .unwrap();
    first.after(move |seq: &mut Sequencer<Band>| -> MidiResult<()> {
        seq.play(tail, |seq: &mut Sequencer<Band>, (degree, duration): (i64, Rational)| {
            sound(seq, 0, degree, duration)
        })?;
        Ok(())
    });

    engine.start().unwrap();
    let pitches: Vec<u8> = sink.onsets().into_iter().map(|(pitch, _)| pitch).collect();
    assert_eq!(pitches, vec![60, 72, 62, 74, 64, 60, 67]);
    assert_eq!(sink.onsets()[5].1, pos(5, 4));
}

/// Cancelling a playback stops reading the series.
#[test]
fn test_cancel_playback() {
    let (context, sink) = band(1);
    let mut engine = scripted_engine(context, beats(4));

    let endless = count_from(0i64, 1)
        .unwrap()
        .map(|degree: i64| (degree, r(1, 4)));
    let seq = engine.sequencer_mut();
    let playback = seq
        .play(endless, |seq: &mut Sequencer<Band>, (degree, duration): (i64, Rational)| {
            sound(seq, 0, degree, duration)
        })
        .unwrap();
    seq.at(1, move |_: &mut Sequencer<Band>| {
        playback.cancel();
    })
    .unwrap();

    engine.start().unwrap();
    // Notes at 0, 1/4, 1/2 and 3/4; the one due at 1 was scheduled after the
    // cancelling action and never read.
    assert_eq!(sink.onsets().len(), 4);
}
