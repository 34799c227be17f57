// Whole-matrix evaluation for one input vector.
//
// `LogicMatrix` is the per-tick compiled form of the panel: six operations and
// three accumulators. `evaluate` runs every operation against a vector,
// counts how many operations target each accumulator (`total`) and how many
// of those are high (`high`), and folds the tallies into a single chord
// pitch.
//
// The pitch couples all accumulators: it is the sum over *every* accumulator
// of `pitch_per_hit * high`, computed from the finished tallies, so the
// percentile search for one accumulator ranks variants by the whole chord.

use crate::accumulator::Accumulator;
use crate::bit_vector::BitVector;
use crate::operation::LogicOperation;
use crate::{NUM_ACCUMULATORS, NUM_OPERATIONS};

/// Tallies and chord pitch for one evaluated vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MatrixEvalResult {
    pub high: [u8; NUM_ACCUMULATORS],
    pub total: [u8; NUM_ACCUMULATORS],
    pub pitch: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LogicMatrix {
    pub operations: [LogicOperation; NUM_OPERATIONS],
    pub accumulators: [Accumulator; NUM_ACCUMULATORS],
}

impl LogicMatrix {
    pub fn new(
        operations: [LogicOperation; NUM_OPERATIONS],
        accumulators: [Accumulator; NUM_ACCUMULATORS],
    ) -> Self {
        LogicMatrix {
            operations,
            accumulators,
        }
    }

    pub fn evaluate(&self, input: BitVector) -> MatrixEvalResult {
        let mut result = MatrixEvalResult::default();
        for op in &self.operations {
            let target = op.target();
            result.total[target] += 1;
            if op.value(input) {
                result.high[target] += 1;
            }
        }
        result.pitch = self.chord_pitch(&result.high);
        result
    }

    /// Per-operation results, in row order.
    pub fn operation_values(&self, input: BitVector) -> [bool; NUM_OPERATIONS] {
        std::array::from_fn(|i| self.operations[i].value(input))
    }

    /// Sum of `pitch_per_hit * high` over all accumulators.
    pub fn chord_pitch(&self, high: &[u8; NUM_ACCUMULATORS]) -> f32 {
        self.accumulators
            .iter()
            .zip(high)
            .map(|(acc, &h)| acc.pitch_per_hit() * f32::from(h))
            .sum()
    }
}
