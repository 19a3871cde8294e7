//! # 05 - Gestures
//!
//! Random clusters of notes placed at free rational offsets inside each bar,
//! including offsets that fall between clock ticks.
//!
//! **Concepts:** `play_timed`, `TimedValue`, lateness reporting, `wait`
//!
//! ```bash
//! RUST_LOG=debug cargo run --example 05_gestures
//! ```

use cantus::midi::Result as MidiResult;
use cantus::prelude::*;
use tracing_subscriber::EnvFilter;

struct Gestures {
    voices: MidiVoices,
    scale: Scale,
}

fn gesture(bar: i64) -> cantus::Result<impl Series<Item = TimedValue<i64>>> {
    let offsets = rnd(vec![r(0, 1), r(1, 5), r(1, 3), r(3, 7), r(1, 2), r(2, 3), r(4, 5)])?;
    let degrees = rnd(vec![0i64, 2, 4, 6, 7, 9, 11])?;
    Ok(offsets
        .zip(degrees)
        .max_size(6)
        .map(move |(offset, degree)| TimedValue::new(offset * 4, degree + bar % 3)))
}

fn main() -> cantus::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let gestures = Gestures {
        voices: MidiVoices::new(TracingSink::new(4, 24), 1)?,
        scale: Scale::chromatic(60),
    };
    let mut engine = CantusEngine::builder().bpm(72.0).build(gestures)?;
    engine.after_stop(|seq: &mut Sequencer<Gestures>| seq.context().voices.panic());

    let seq = engine.sequencer_mut();
    for bar in 0..4i64 {
        let cluster = gesture(bar)?;
        seq.at(4 * bar, move |seq: &mut Sequencer<Gestures>| -> MidiResult<()> {
            seq.play_timed(
                cluster,
                |seq: &mut Sequencer<Gestures>, event: TimedEvent<i64>| -> MidiResult<()> {
                    if event.started_ago > r(0, 1) {
                        tracing::debug!("Gesture note {} beats late", event.started_ago);
                    }
                    let pitch = seq.context().scale.pitch(event.value as i32);
                    let voice = seq.context().voices.voice(0)?;
                    voice.note(seq, pitch, 70, r(1, 3))?;
                    Ok(())
                },
            )?;
            Ok(())
        })?;
    }
    seq.at(16, |seq: &mut Sequencer<Gestures>| -> cantus::core::Result<()> {
        seq.wait(2, |seq: &mut Sequencer<Gestures>| seq.stop_transport())?;
        Ok(())
    })?;

    let handle = engine.handle();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        tracing::warn!("Ctrl+C will not stop the engine cleanly: {}", e);
    }
    engine.start()?;
    Ok(())
}
