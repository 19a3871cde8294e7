//! # 03 - Canon
//!
//! Two voices read one random theme through shared cursors, the second
//! entering a bar later and a third higher. When both are done a cadence
//! chord sounds and the piece stops two beats later.
//!
//! **Concepts:** Buffered series, multiple voices, `after` continuations,
//! `wait`
//!
//! ```bash
//! RUST_LOG=info cargo run --example 03_canon
//! ```

use cantus::midi::Result as MidiResult;
use cantus::prelude::*;
use tracing_subscriber::EnvFilter;

struct Canon {
    voices: MidiVoices,
    scale: Scale,
    finished: usize,
}

const ENTRIES: usize = 2;

/// Tonic chord on every voice, then stop.
fn cadence(seq: &mut Sequencer<Canon>) -> MidiResult<()> {
    let scale = seq.context().scale.clone();
    let chord: Vec<u8> = [0, 2, 4, 7]
        .iter()
        .filter_map(|&degree| scale.pitch(degree))
        .collect();
    for voice in seq.context().voices.voices().to_vec() {
        voice.note(seq, chord.iter().copied(), 70, 2)?;
    }
    seq.wait(2, |seq: &mut Sequencer<Canon>| seq.stop_transport())?;
    Ok(())
}

fn main() -> cantus::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let canon = Canon {
        voices: MidiVoices::new(TracingSink::new(4, 24), ENTRIES)?,
        scale: Scale::minor(57),
        finished: 0,
    };
    let mut engine = CantusEngine::builder().bpm(132.0).build(canon)?;

    let theme = rnd(vec![0i64, 1, 2, 3, 4, 6])?.max_size(12).buffered();
    let durations = s![r(1, 2), r(1, 4), r(1, 4), r(1, 1)];

    engine.after_stop(|seq: &mut Sequencer<Canon>| seq.context().voices.panic());
    for entry in 0..ENTRIES {
        let line = theme
            .cursor()
            .zip(durations.clone().repeat_forever()?)
            .map(move |(degree, duration)| (degree + 2 * entry as i64, duration));

        engine.sequencer_mut().at(
            4 * entry as i64,
            move |seq: &mut Sequencer<Canon>| -> MidiResult<()> {
                let playback = seq.play(
                    line,
                    move |seq: &mut Sequencer<Canon>,
                          (degree, duration): (i64, Rational)|
                          -> MidiResult<()> {
                        let pitch = seq.context().scale.pitch(degree as i32);
                        let voice = seq.context().voices.voice(entry)?;
                        voice.note(seq, pitch, 80, duration)?;
                        Ok(())
                    },
                )?;
                playback.after(|seq: &mut Sequencer<Canon>| -> MidiResult<()> {
                    seq.context_mut().finished += 1;
                    if seq.context().finished == ENTRIES {
                        cadence(seq)?;
                    }
                    Ok(())
                });
                Ok(())
            },
        )?;
    }

    let handle = engine.handle();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        tracing::warn!("Ctrl+C will not stop the engine cleanly: {}", e);
    }
    engine.start()?;
    Ok(())
}
