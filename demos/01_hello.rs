//! # 01 - Hello
//!
//! Play a C major scale on one voice and stop after two bars.
//!
//! **Concepts:** Engine setup, record series, `play`, stopping from an action
//!
//! ```bash
//! RUST_LOG=info cargo run --example 01_hello
//! ```

use cantus::midi::Result as MidiResult;
use cantus::prelude::*;
use tracing_subscriber::EnvFilter;

struct Song {
    voices: MidiVoices,
    scale: Scale,
}

fn main() -> cantus::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let song = Song {
        voices: MidiVoices::new(TracingSink::new(4, 24), 1)?,
        scale: Scale::major(60),
    };
    let mut engine = CantusEngine::builder().bpm(120.0).build(song)?;

    let scale = record()
        .field("grade", for_range(0i64, 7, 1)?)
        .field("duration", s![r(1, 4)].repeat_forever()?)
        .build()?;

    engine.after_stop(|seq: &mut Sequencer<Song>| seq.context().voices.panic());
    let seq = engine.sequencer_mut();
    seq.at(0, move |seq: &mut Sequencer<Song>| -> MidiResult<()> {
        seq.play(scale, |seq: &mut Sequencer<Song>, note: Record| -> MidiResult<()> {
            let degree = note.int("grade").unwrap_or(0) as i32;
            let pitch = seq.context().scale.pitch(degree);
            let voice = seq.context().voices.voice(0)?;
            voice.note(seq, pitch, 90, r(1, 4))?;
            Ok(())
        })?;
        Ok(())
    })?;
    seq.at(8, |seq: &mut Sequencer<Song>| seq.stop_transport())?;

    let handle = engine.handle();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        tracing::warn!("Ctrl+C will not stop the engine cleanly: {}", e);
    }
    engine.start()?;
    println!("Done at {}", engine.position());
    Ok(())
}
