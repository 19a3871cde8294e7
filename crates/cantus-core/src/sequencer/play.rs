//! Series playback bound to the sequencer.

use super::{panic_message, ActionOutcome, Control, Sequencer};
use crate::position::IntoBeats;
use crate::{BoxError, Error, Position, Result};
use cantus_series::{Rational, Record, Series};
use num_traits::Zero;
use std::panic::{self, AssertUnwindSafe};

/// Elements that know how long they last, in beats.
pub trait HasDuration {
    fn duration(&self) -> Option<Rational>;
}

impl HasDuration for Rational {
    fn duration(&self) -> Option<Rational> {
        Some(*self)
    }
}

/// Records carry their duration in the `duration` field.
impl HasDuration for Record {
    fn duration(&self) -> Option<Rational> {
        self.rational("duration")
    }
}

impl<T> HasDuration for (T, Rational) {
    fn duration(&self) -> Option<Rational> {
        Some(self.1)
    }
}

/// Element of a [`Sequencer::play_timed`] series: a value placed `time`
/// beats after the playback start.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedValue<T> {
    pub time: Rational,
    pub value: T,
}

impl<T> TimedValue<T> {
    pub fn new(time: impl IntoBeats, value: T) -> Self {
        Self {
            time: time.into_beats(),
            value,
        }
    }
}

/// What a `play_timed` callback receives.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent<T> {
    pub value: T,
    /// Offset from the playback start.
    pub time: Rational,
    /// How far behind its scheduled position the clock already was when the
    /// element ran. Zero unless the element was late.
    pub started_ago: Rational,
}

fn checked_duration<T: HasDuration>(item: &T) -> Result<Rational> {
    match item.duration() {
        Some(duration) if duration > Rational::zero() => Ok(duration),
        Some(duration) => Err(Error::InvalidDuration(format!(
            "play element duration {} must be positive",
            duration
        ))),
        None => Err(Error::InvalidDuration(
            "play element has no duration".to_owned(),
        )),
    }
}

fn checked_offset(time: Rational) -> Result<Rational> {
    if time < Rational::zero() {
        return Err(Error::InvalidDuration(format!(
            "timed element offset {} must be non-negative",
            time
        )));
    }
    Ok(time)
}

struct Playback<S, F, C> {
    series: S,
    callback: F,
    control: Control<C>,
}

struct TimedPlayback<S, F, C> {
    series: S,
    callback: F,
    control: Control<C>,
    start: Position,
}

impl<C: 'static> Sequencer<C> {
    /// Play `series` element by element.
    ///
    /// The first element is read and handed to `callback` immediately. The
    /// next one is read once the first element's duration has elapsed, and
    /// so on until the series is exhausted or the returned control is
    /// cancelled.
    ///
    /// If the first callback fails the playback is cancelled and the error
    /// is returned as [`Error::Callback`], so an enclosing action counts as
    /// failed. Failures of later elements are counted by the step that ran
    /// them and the playback carries on.
    ///
    /// # Example
    /// ```ignore
    /// let melody = record()
    ///     .field("grade", s![0, 2, 4])
    ///     .field("duration", s![r(1, 4)].repeat_forever()?)
    ///     .build()?;
    /// seq.play(melody, |seq, note| {
    ///     seq.context_mut().voice(0).note(...);
    /// })?;
    /// ```
    pub fn play<S, F, O>(&mut self, series: S, callback: F) -> Result<Control<C>>
    where
        S: Series + 'static,
        S::Item: HasDuration,
        F: FnMut(&mut Sequencer<C>, S::Item) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let control = self.new_control();
        let mut series = series;
        let Some(first) = series.next_value() else {
            control.terminate();
            return Ok(control);
        };
        let duration = checked_duration(&first)?;

        let playback = Playback {
            series,
            callback,
            control: control.clone(),
        };
        if let Err(error) = play_step(self, playback, first, duration) {
            tracing::error!("Play callback at {} failed: {}", self.position(), error);
            control.cancel();
            return Err(Error::Callback(error));
        }
        Ok(control)
    }

    /// Play a series of [`TimedValue`]s. Each element runs at the playback
    /// start plus its own offset, so consecutive elements may overlap or
    /// share a position.
    pub fn play_timed<T, S, F, O>(&mut self, series: S, callback: F) -> Result<Control<C>>
    where
        T: Send + 'static,
        S: Series<Item = TimedValue<T>> + 'static,
        F: FnMut(&mut Sequencer<C>, TimedEvent<T>) -> O + Send + 'static,
        O: ActionOutcome,
    {
        let control = self.new_control();
        let mut series = series;
        let Some(first) = series.next_value() else {
            control.terminate();
            return Ok(control);
        };
        checked_offset(first.time)?;

        let playback = TimedPlayback {
            series,
            callback,
            control: control.clone(),
            start: self.position(),
        };
        schedule_timed(self, playback, first);
        Ok(control)
    }
}

fn play_step<C, S, F, O>(
    seq: &mut Sequencer<C>,
    mut playback: Playback<S, F, C>,
    item: S::Item,
    duration: Rational,
) -> core::result::Result<(), BoxError>
where
    C: 'static,
    S: Series + 'static,
    S::Item: HasDuration,
    F: FnMut(&mut Sequencer<C>, S::Item) -> O + Send + 'static,
    O: ActionOutcome,
{
    let next_at = seq.position() + duration;
    let control = playback.control.clone();
    let callback = &mut playback.callback;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        seq.with_control(&control, |seq| callback(seq, item).into_result())
    }));
    let result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            tracing::error!("Play callback panicked: {}", panic_message(&*payload));
            control.terminate();
            panic::resume_unwind(payload)
        }
    };
    if control.is_terminated() {
        return result;
    }

    seq.schedule(
        next_at,
        Some(control.id()),
        Box::new(move |seq: &mut Sequencer<C>| {
            let mut playback = playback;
            let Some(item) = playback.series.next_value() else {
                playback.control.terminate();
                return Ok(());
            };
            match checked_duration(&item) {
                Ok(duration) => play_step(seq, playback, item, duration),
                Err(error) => {
                    playback.control.terminate();
                    Err(error.into())
                }
            }
        }),
    );
    result
}

fn schedule_timed<C, T, S, F, O>(
    seq: &mut Sequencer<C>,
    playback: TimedPlayback<S, F, C>,
    item: TimedValue<T>,
) where
    C: 'static,
    T: Send + 'static,
    S: Series<Item = TimedValue<T>> + 'static,
    F: FnMut(&mut Sequencer<C>, TimedEvent<T>) -> O + Send + 'static,
    O: ActionOutcome,
{
    let at = playback.start + item.time;
    let owner = playback.control.id();
    seq.schedule(
        at,
        Some(owner),
        Box::new(move |seq: &mut Sequencer<C>| {
            let mut playback = playback;
            let event = TimedEvent {
                value: item.value,
                time: item.time,
                started_ago: seq.now() - at,
            };

            let control = playback.control.clone();
            let callback = &mut playback.callback;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                seq.with_control(&control, |seq| callback(seq, event).into_result())
            }));
            let result = match outcome {
                Ok(result) => result,
                Err(payload) => {
                    control.terminate();
                    panic::resume_unwind(payload)
                }
            };
            if control.is_terminated() {
                return result;
            }

            match playback.series.next_value() {
                None => {
                    control.terminate();
                }
                Some(next) => match checked_offset(next.time) {
                    Ok(_) => schedule_timed(seq, playback, next),
                    Err(error) => {
                        control.terminate();
                        return Err(error.into());
                    }
                },
            }
            result
        }),
    );
}
