// Note naming on the just-intonation lattice.
//
// A lattice position is a count of steps along each accumulator's interval
// axis. Its name combines two sums over the axes:
//
// - generic: letter-name steps (`generic_step` of each interval), mod 7,
//   picks the natural letter C..B.
// - chromatic: semitones, mod 12, is the pitch class actually reached.
//
// The gap between the chromatic pitch class and the natural letter's pitch
// class becomes accidentals: up to 6 semitones spelled as sharps, beyond
// that as flats. There is no cap, so stacked intervals can produce names
// like `F####`. Both sums use Euclidean modulo so negative positions name
// correctly.

use std::fmt;

use logic_matrix_engine::NUM_ACCUMULATORS;
use serde::{Deserialize, Serialize};

/// Pitch class of each natural letter, C through B.
pub const NATURAL_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Letter-name steps spanned by each semitone count within an octave.
const GENERIC_STEPS: [i32; 12] = [0, 1, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteBase {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteBase {
    pub const ALL: [NoteBase; 7] = [
        NoteBase::C,
        NoteBase::D,
        NoteBase::E,
        NoteBase::F,
        NoteBase::G,
        NoteBase::A,
        NoteBase::B,
    ];

    pub fn letter(self) -> char {
        match self {
            NoteBase::C => 'C',
            NoteBase::D => 'D',
            NoteBase::E => 'E',
            NoteBase::F => 'F',
            NoteBase::G => 'G',
            NoteBase::A => 'A',
            NoteBase::B => 'B',
        }
    }

    pub fn natural_semitones(self) -> i32 {
        NATURAL_SEMITONES[self as usize]
    }

    /// Letter for a generic step count, folded into one octave.
    pub fn from_generic(generic: i64) -> Self {
        NoteBase::ALL[generic.rem_euclid(7) as usize]
    }
}

/// Letter-name steps spanned by an interval of `semitones`: 7 per octave
/// plus the in-octave table (so a fifth is 4 steps, an octave 7).
pub fn generic_step(semitones: i32) -> i32 {
    7 * semitones.div_euclid(12) + GENERIC_STEPS[semitones.rem_euclid(12) as usize]
}

/// A spelled note: natural letter plus zero or more sharps or flats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteName {
    pub base: NoteBase,
    /// Sharps when true, flats otherwise. Meaningless with no accidentals.
    pub sharp: bool,
    pub accidentals: u32,
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.letter())?;
        let mark = if self.sharp { '#' } else { 'b' };
        for _ in 0..self.accidentals {
            write!(f, "{mark}")?;
        }
        Ok(())
    }
}

/// Name the lattice point at `positions` given each axis's interval in
/// semitones.
pub fn spell(
    positions: &[i32; NUM_ACCUMULATORS],
    intervals: &[i32; NUM_ACCUMULATORS],
) -> NoteName {
    let mut generic: i64 = 0;
    let mut chromatic: i64 = 0;
    for (&pos, &interval) in positions.iter().zip(intervals) {
        generic += i64::from(pos) * i64::from(generic_step(interval));
        chromatic += i64::from(pos) * i64::from(interval);
    }

    let base = NoteBase::from_generic(generic);
    let diff = (chromatic - i64::from(base.natural_semitones())).rem_euclid(12) as u32;
    if diff <= 6 {
        NoteName {
            base,
            sharp: true,
            accidentals: diff,
        }
    } else {
        NoteName {
            base,
            sharp: false,
            accidentals: 12 - diff,
        }
    }
}
