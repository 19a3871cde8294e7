//! # 04 - Sections
//!
//! A bass line loops every bar while named events switch between a verse and
//! a chorus figure. The form is itself a series of section names.
//!
//! **Concepts:** `every`, named events, `launch_with`, cancelling a control
//!
//! ```bash
//! RUST_LOG=info cargo run --example 04_sections
//! ```

use cantus::midi::Result as MidiResult;
use cantus::prelude::*;
use tracing_subscriber::EnvFilter;

struct Piece {
    voices: MidiVoices,
    scale: Scale,
    figure: Option<Control<Piece>>,
}

const BASS: usize = 0;
const LEAD: usize = 1;

fn sound(
    seq: &mut Sequencer<Piece>,
    voice: usize,
    degree: i64,
    duration: Rational,
) -> MidiResult<()> {
    let pitch = seq.context().scale.pitch(degree as i32);
    let voice = seq.context().voices.voice(voice)?;
    voice.note(seq, pitch, 96, duration)?;
    Ok(())
}

/// Swap the running lead figure for `figure`.
fn switch_figure(
    seq: &mut Sequencer<Piece>,
    figure: Vec<i64>,
    step: Rational,
) -> cantus::Result<()> {
    if let Some(previous) = seq.context_mut().figure.take() {
        previous.cancel();
    }
    let notes = s(figure).repeat_forever()?.map(move |degree| (degree, step));
    let control = seq.play(notes, |seq: &mut Sequencer<Piece>, (degree, step): (i64, Rational)| {
        sound(seq, LEAD, degree, step)
    })?;
    seq.context_mut().figure = Some(control);
    Ok(())
}

fn main() -> cantus::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let piece = Piece {
        voices: MidiVoices::new(TracingSink::new(4, 24), 2)?,
        scale: Scale::major(48),
        figure: None,
    };
    let mut engine = CantusEngine::builder().bpm(110.0).log_events(true).build(piece)?;
    engine.after_stop(|seq: &mut Sequencer<Piece>| seq.context().voices.panic());

    let seq = engine.sequencer_mut();
    seq.on("verse", |seq: &mut Sequencer<Piece>, _: &EventArgs| {
        switch_figure(seq, vec![7, 9, 11, 9], r(1, 2))
    });
    seq.on("chorus", |seq: &mut Sequencer<Piece>, args: &EventArgs| {
        let lift = args.get::<i64>(0).copied().unwrap_or(0);
        switch_figure(seq, vec![14 + lift, 11, 9, 11, 7, 9], r(1, 3))
    });

    let mut bass = s![0i64, 3, 4, 0].repeat_forever()?;
    seq.every(4, move |seq: &mut Sequencer<Piece>| -> MidiResult<()> {
        let degree = bass.next_value().unwrap_or(0);
        sound(seq, BASS, degree - 7, r(4, 1))
    })?;

    let form = s![("verse", 0i64), ("chorus", 0), ("verse", 0), ("chorus", 2)];
    let sections = form.map(|section| (section, r(8, 1)));
    seq.at(0, move |seq: &mut Sequencer<Piece>| -> cantus::core::Result<()> {
        let played = seq.play(
            sections,
            |seq: &mut Sequencer<Piece>, ((name, lift), _): ((&'static str, i64), Rational)| {
                tracing::info!("Section '{}' at {}", name, seq.bbt());
                seq.launch_with(name, event_args![lift])
            },
        )?;
        played.after(|seq: &mut Sequencer<Piece>| seq.stop_transport());
        Ok(())
    })?;

    let handle = engine.handle();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        tracing::warn!("Ctrl+C will not stop the engine cleanly: {}", e);
    }
    engine.start()?;
    Ok(())
}
