//! # 06 - MIDI Clock
//!
//! Follow MIDI clock from an input port and print every bar. Start the
//! master (DAW, drum machine) after launching.
//!
//! **Concepts:** `midi-io` feature, external clock, song position
//!
//! ```bash
//! cargo run --example 06_midi_clock --features midi-io -- "IAC"
//! ```

use cantus::prelude::*;
use cantus::MidiClockInput;
use tracing_subscriber::EnvFilter;

fn main() -> cantus::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let Some(port) = std::env::args().nth(1) else {
        println!("Usage: 06_midi_clock <port name>");
        println!("Available input ports:");
        for name in MidiClockInput::ports()? {
            println!("  {}", name);
        }
        return Ok(());
    };

    let mut engine = CantusEngine::builder().midi_clock(port).build(())?;
    engine.on_start(|seq: &mut Sequencer| tracing::info!("Clock started at {}", seq.bbt()));
    engine.sequencer_mut().every(4, |seq: &mut Sequencer| {
        println!("bar {}", seq.bbt().bar);
    })?;

    let handle = engine.handle();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        tracing::warn!("Ctrl+C will not stop the engine cleanly: {}", e);
    }
    engine.start()?;
    Ok(())
}
