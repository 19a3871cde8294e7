//! Scale degrees to MIDI pitches.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Resolves a signed scale degree to a MIDI pitch.
pub trait PitchResolver {
    /// `None` when the degree falls outside the MIDI range.
    fn pitch(&self, degree: i32) -> Option<u8>;
}

const MAJOR: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Equal-tempered scale anchored at a root pitch.
///
/// Degree 0 is the root; degrees wrap into higher or lower octaves, so
/// degree 7 of a major scale is the root an octave up and degree -1 is the
/// leading tone below the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    root: u8,
    intervals: Vec<u8>,
}

impl Scale {
    /// Scale from semitone offsets within one octave. Offsets must start at
    /// zero, be strictly ascending and stay below 12.
    pub fn new(root: u8, intervals: Vec<u8>) -> Result<Self> {
        if root > 127 {
            return Err(Error::InvalidScale(format!("root {} above 127", root)));
        }
        if intervals.first() != Some(&0) {
            return Err(Error::InvalidScale("intervals must start at 0".into()));
        }
        if intervals.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidScale(
                "intervals must be strictly ascending".into(),
            ));
        }
        if intervals.iter().any(|&step| step >= 12) {
            return Err(Error::InvalidScale("intervals must be below 12".into()));
        }
        Ok(Self { root, intervals })
    }

    pub fn major(root: u8) -> Self {
        Self {
            root: root.min(127),
            intervals: MAJOR.to_vec(),
        }
    }

    /// Natural minor.
    pub fn minor(root: u8) -> Self {
        Self {
            root: root.min(127),
            intervals: MINOR.to_vec(),
        }
    }

    pub fn chromatic(root: u8) -> Self {
        Self {
            root: root.min(127),
            intervals: (0..12).collect(),
        }
    }

    pub fn root(&self) -> u8 {
        self.root
    }

    /// Degrees per octave.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Same intervals on another root.
    pub fn transpose(&self, semitones: i32) -> Option<Self> {
        let root = u8::try_from(i32::from(self.root) + semitones).ok()?;
        (root <= 127).then(|| Self {
            root,
            intervals: self.intervals.clone(),
        })
    }
}

impl PitchResolver for Scale {
    fn pitch(&self, degree: i32) -> Option<u8> {
        let len = i32::try_from(self.intervals.len()).ok().filter(|&len| len > 0)?;
        let octave = degree.div_euclid(len);
        let step = self.intervals[degree.rem_euclid(len) as usize];
        let pitch = i32::from(self.root) + 12 * octave + i32::from(step);
        u8::try_from(pitch).ok().filter(|&pitch| pitch <= 127)
    }
}
