//! # 02 - Series Explorer
//!
//! Print what the series constructors and combinators produce, then hear
//! four of them side by side: a literal, a range, a random pick and the
//! Fibonacci numbers folded into a scale.
//!
//! **Concepts:** Leaf series, transformations, merge/concat, buffering,
//! `after_delay`
//!
//! ```bash
//! RUST_LOG=info cargo run --example 02_series_explorer
//! ```

use cantus::midi::Result as MidiResult;
use cantus::prelude::*;
use tracing_subscriber::EnvFilter;

struct Explorer {
    voices: MidiVoices,
    scale: Scale,
}

fn show<S>(name: &str, series: S)
where
    S: Series,
    S::Item: std::fmt::Debug,
{
    let values: Vec<_> = series.max_size(16).iter().collect();
    println!("{:<28} {:?}", name, values);
}

fn main() -> cantus::Result<()> {
    show("s![0, 2, 4]", s![0, 2, 4]);
    show("for_range(0, 10, 3)", for_range(0, 10, 3)?);
    show("for_range(1/2, 0, 1/8)", for_range(r(1, 2), r(0, 1), r(1, 8))?);
    show("count_from(100, 7)", count_from(100, 7)?);
    show("fibo()", fibo());
    show("rnd_seeded([60, 64, 67])", rnd_seeded(vec![60, 64, 67], 1)?);
    show(
        "unfold(doubling)",
        unfold(1i64, |n: &mut i64| {
            let value = *n;
            *n = n.checked_mul(2)?;
            Some(value)
        }),
    );

    show("map(x * 12)", s![0, 1, 2].map(|octave: i32| octave * 12));
    show("select(even)", for_range(0, 12, 1)?.select(|n: &i32| n % 2 == 0));
    show("reverse", s!["a", "b", "c"].reverse());
    show("repeat(3)", s![1, 2].repeat(3)?);
    show("repeat_forever", s![r(1, 4), r(1, 8)].repeat_forever()?);
    show("zip", s![60, 62, 64].zip(s![r(1, 2), r(1, 4)]));
    show("merge", merge(vec![s![0, 1, 2], s![10, 11]]));
    show("concat", concat(vec![s![0, 1], s![10, 11, 12]]));

    let melody = record()
        .field("grade", s![0, 2, 4])
        .field("duration", s![r(1, 4)].repeat_forever()?)
        .build()?;
    for note in melody.iter() {
        println!("{:<28} {:?}", "record", note);
    }

    let theme = rnd_seeded(vec![0, 2, 4, 5, 7], 3)?.max_size(6).buffered();
    show("buffered cursor a", theme.cursor());
    show("buffered cursor b", theme.cursor());

    listen()
}

/// Play `degrees` on voice `voice`, one note per `step` beats.
fn voice_line<S>(
    seq: &mut Sequencer<Explorer>,
    voice: usize,
    degrees: S,
    step: Rational,
) -> MidiResult<Control<Explorer>>
where
    S: Series<Item = i64> + 'static,
{
    let notes = degrees.map(move |degree| (degree, step));
    let control = seq.play(
        notes,
        move |seq: &mut Sequencer<Explorer>, (degree, step): (i64, Rational)| -> MidiResult<()> {
            let pitch = seq.context().scale.pitch(degree as i32);
            let line = seq.context().voices.voice(voice)?;
            line.note(seq, pitch, 80, step)?;
            Ok(())
        },
    )?;
    Ok(control)
}

fn listen() -> cantus::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let explorer = Explorer {
        voices: MidiVoices::new(TracingSink::new(4, 24), 4)?,
        scale: Scale::major(48),
    };
    let mut engine = CantusEngine::builder().bpm(100.0).build(explorer)?;
    engine.after_stop(|seq: &mut Sequencer<Explorer>| seq.context().voices.panic());

    let literal = s![0i64, 4, 7, 4].repeat(4)?;
    let range = for_range(14i64, 7, 1)?.repeat(2)?;
    let random = rnd(vec![9i64, 11, 12, 14])?.max_size(16);
    let fibonacci = fibo().map(|n| n % 7 + 21).max_size(12);

    engine.sequencer_mut().at(0, move |seq: &mut Sequencer<Explorer>| -> MidiResult<()> {
        voice_line(seq, 0, literal, r(1, 1))?;
        voice_line(seq, 1, range, r(1, 1))?;
        voice_line(seq, 2, random, r(1, 2))?;
        let last = voice_line(seq, 3, fibonacci, r(1, 3))?;
        // Let the other lines ring out after the fastest one ends.
        last.after_delay(12, |seq: &mut Sequencer<Explorer>| seq.stop_transport())?;
        Ok(())
    })?;

    let handle = engine.handle();
    if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
        tracing::warn!("Ctrl+C will not stop the engine cleanly: {}", e);
    }
    engine.start()?;
    Ok(())
}
