// Fixed-width bit vector over the input channels.
//
// One bit per channel, bit `i` is channel `i`. Every constructor and operator
// masks the result to the low `NUM_CHANNELS` bits, so bits beyond the channel
// count are always zero, `!v` included.

use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::NUM_CHANNELS;

const CHANNEL_MASK: u8 = ((1u16 << NUM_CHANNELS) - 1) as u8;

/// A set of channels, or one boolean per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitVector(u8);

impl BitVector {
    pub const EMPTY: BitVector = BitVector(0);
    pub const FULL: BitVector = BitVector(CHANNEL_MASK);

    /// Build from raw bits, dropping anything above the channel count.
    pub const fn from_bits(bits: u8) -> Self {
        BitVector(bits & CHANNEL_MASK)
    }

    /// Build from one boolean per channel.
    pub fn from_bools(values: &[bool; NUM_CHANNELS]) -> Self {
        let mut v = BitVector::EMPTY;
        for (i, &value) in values.iter().enumerate() {
            v.set(i, value);
        }
        v
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn get(self, channel: usize) -> bool {
        channel < NUM_CHANNELS && self.0 & (1 << channel) != 0
    }

    /// Set or clear one channel. Out-of-range channels are ignored.
    pub fn set(&mut self, channel: usize, value: bool) {
        debug_assert!(channel < NUM_CHANNELS, "channel {channel} out of range");
        if channel >= NUM_CHANNELS {
            return;
        }
        if value {
            self.0 |= 1 << channel;
        } else {
            self.0 &= !(1 << channel);
        }
    }

    pub fn clear(&mut self, channel: usize) {
        self.set(channel, false);
    }

    /// Copy with one channel set or cleared.
    pub fn with(mut self, channel: usize, value: bool) -> Self {
        self.set(channel, value);
        self
    }

    pub const fn count_ones(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Channel indices whose bit is set, ascending.
    pub fn ones(self) -> impl Iterator<Item = usize> {
        (0..NUM_CHANNELS).filter(move |&i| self.get(i))
    }

    /// Per-channel bits as 0/1 integers.
    pub fn to_array(self) -> [u8; NUM_CHANNELS] {
        std::array::from_fn(|i| self.get(i) as u8)
    }
}

impl BitAnd for BitVector {
    type Output = BitVector;
    fn bitand(self, rhs: BitVector) -> BitVector {
        BitVector(self.0 & rhs.0)
    }
}

impl BitOr for BitVector {
    type Output = BitVector;
    fn bitor(self, rhs: BitVector) -> BitVector {
        BitVector(self.0 | rhs.0)
    }
}

impl BitXor for BitVector {
    type Output = BitVector;
    fn bitxor(self, rhs: BitVector) -> BitVector {
        BitVector(self.0 ^ rhs.0)
    }
}

impl Not for BitVector {
    type Output = BitVector;
    fn not(self) -> BitVector {
        BitVector(!self.0 & CHANNEL_MASK)
    }
}
