// Co-mute variant enumeration.
//
// An accumulator's co-mute mask names the channels it treats as "free": during
// its search, those channels take every combination of values while all other
// channels keep their live value. `InputVectorIterator` produces those
// `2^k` vectors (k = popcount of the mask) in a fixed order.
//
// Ordinal `n` maps to a vector by scattering the bits of `n` into the mask
// positions, lowest bit of `n` into the lowest masked channel. The mapping is
// pure, so `get()` is idempotent and `reset()` restarts the sequence exactly.

use crate::MAX_CHANNELS;
use crate::bit_vector::BitVector;

#[derive(Clone, Copy, Debug)]
pub struct InputVectorIterator {
    co_mute_count: usize,
    default_vector: BitVector,
    forwarding_indices: [u8; MAX_CHANNELS],
    ordinal: usize,
}

impl InputVectorIterator {
    pub fn new(co_mute_mask: BitVector, default_vector: BitVector) -> Self {
        let mut forwarding_indices = [0u8; MAX_CHANNELS];
        let mut co_mute_count = 0;
        for channel in co_mute_mask.ones() {
            forwarding_indices[co_mute_count] = channel as u8;
            co_mute_count += 1;
        }
        InputVectorIterator {
            co_mute_count,
            default_vector,
            forwarding_indices,
            ordinal: 0,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Total number of variants, `2^k`.
    pub fn variant_count(&self) -> usize {
        1 << self.co_mute_count
    }

    pub fn done(&self) -> bool {
        self.ordinal >= self.variant_count()
    }

    /// The vector for the current ordinal.
    pub fn get(&self) -> BitVector {
        self.vector_at(self.ordinal)
    }

    /// The vector for an arbitrary ordinal in `[0, 2^k)`.
    pub fn vector_at(&self, ordinal: usize) -> BitVector {
        let mut result = self.default_vector;
        for (i, &channel) in self.forwarding_indices[..self.co_mute_count]
            .iter()
            .enumerate()
        {
            result.set(channel as usize, (ordinal >> i) & 1 == 1);
        }
        result
    }

    pub fn advance(&mut self) {
        self.ordinal += 1;
    }

    pub fn reset(&mut self) {
        self.ordinal = 0;
    }
}

impl Iterator for InputVectorIterator {
    type Item = BitVector;

    fn next(&mut self) -> Option<BitVector> {
        if self.done() {
            return None;
        }
        let v = self.get();
        self.advance();
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.variant_count().saturating_sub(self.ordinal);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for InputVectorIterator {}
