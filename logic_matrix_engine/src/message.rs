// Record handed to the lattice display each tick.
//
// Fixed-size and `Copy` so the host can double-buffer it between modules
// without allocation. Zeroed by default; the engine fills it after every
// tick. Nothing on the audio path reads it back.

use serde::{Deserialize, Serialize};

use crate::{NUM_ACCUMULATORS, NUM_CHANNELS};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeMessage {
    /// Configured interval of each accumulator, in semitones (the lattice
    /// axes).
    pub interval_semitones: [i32; NUM_ACCUMULATORS],
    /// `position[a]` is the lattice position of accumulator `a`'s selected
    /// variant: its high count on each accumulator axis.
    pub position: [[i32; NUM_ACCUMULATORS]; NUM_ACCUMULATORS],
    /// `winning_bits[a][c]` is channel `c` (0 or 1) of accumulator `a`'s
    /// selected variant.
    pub winning_bits: [[u8; NUM_CHANNELS]; NUM_ACCUMULATORS],
}
