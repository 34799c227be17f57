// One row of the logic matrix.
//
// A row reads the channels through two masks derived from its per-channel
// three-way switches: `active_mask` (channels that take part) and
// `inverted_mask` (participating channels read inverted). The operator then
// compares the count of high inputs to the count of participating inputs.
//
// Each row also carries the accumulator it votes into, chosen by a three-way
// routing switch whose positions run opposite to the accumulator indices.

use serde::{Deserialize, Serialize};

use crate::bit_vector::BitVector;
use crate::config::snap_switch;
use crate::{NUM_ACCUMULATORS, NUM_CHANNELS};

/// Per-(channel, operation) matrix switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixSwitch {
    Inverted,
    #[default]
    Muted,
    Normal,
}

impl MatrixSwitch {
    pub fn from_raw(raw: f32) -> Self {
        match snap_switch(raw, 3) {
            0 => MatrixSwitch::Inverted,
            1 => MatrixSwitch::Muted,
            _ => MatrixSwitch::Normal,
        }
    }
}

/// Boolean reduction applied to a row's high count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Or,
    And,
    Xor,
    AtLeastTwo,
    Majority,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Or,
        Operator::And,
        Operator::Xor,
        Operator::AtLeastTwo,
        Operator::Majority,
    ];

    /// Map the five-way operator knob (0..=4) to an operator.
    pub fn from_raw(raw: f32) -> Self {
        Operator::ALL[snap_switch(raw, Operator::ALL.len() as u8) as usize]
    }

    /// Apply to `high` of `total` participating inputs.
    ///
    /// With `total == 0` only `And` is true (vacuously).
    pub fn apply(self, high: u32, total: u32) -> bool {
        match self {
            Operator::Or => high > 0,
            Operator::And => high == total,
            Operator::Xor => high % 2 == 1,
            Operator::AtLeastTwo => high >= 2,
            Operator::Majority => 2 * high > total,
        }
    }
}

/// Three-position routing switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSwitch {
    Down,
    #[default]
    Middle,
    Up,
}

impl TargetSwitch {
    pub fn from_raw(raw: f32) -> Self {
        match snap_switch(raw, 3) {
            0 => TargetSwitch::Down,
            1 => TargetSwitch::Middle,
            _ => TargetSwitch::Up,
        }
    }

    pub fn position(self) -> usize {
        self as usize
    }

    /// Accumulator index this switch routes to. Up is accumulator 0 on the
    /// panel but switch position 2, so the mapping is inverted.
    pub fn target_accumulator(self) -> usize {
        NUM_ACCUMULATORS - self.position() - 1
    }
}

/// Participating/high counts for one row and one input vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub high: u32,
    pub total: u32,
}

/// A compiled matrix row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogicOperation {
    active_mask: BitVector,
    inverted_mask: BitVector,
    operator: Operator,
    target: usize,
}

impl LogicOperation {
    /// Build from explicit masks. `inverted` is restricted to `active`.
    pub fn new(
        active: BitVector,
        inverted: BitVector,
        operator: Operator,
        target: usize,
    ) -> Self {
        debug_assert!(target < NUM_ACCUMULATORS);
        LogicOperation {
            active_mask: active,
            inverted_mask: inverted & active,
            operator,
            target: target.min(NUM_ACCUMULATORS - 1),
        }
    }

    /// Build from one row of matrix switches plus the row's operator knob and
    /// routing switch.
    pub fn from_switches(
        switches: &[MatrixSwitch; NUM_CHANNELS],
        operator: Operator,
        routing: TargetSwitch,
    ) -> Self {
        let mut active = BitVector::EMPTY;
        let mut inverted = BitVector::EMPTY;
        for (channel, switch) in switches.iter().enumerate() {
            match switch {
                MatrixSwitch::Inverted => {
                    active.set(channel, true);
                    inverted.set(channel, true);
                }
                MatrixSwitch::Muted => {}
                MatrixSwitch::Normal => active.set(channel, true),
            }
        }
        LogicOperation::new(active, inverted, operator, routing.target_accumulator())
    }

    pub fn active_mask(&self) -> BitVector {
        self.active_mask
    }

    pub fn inverted_mask(&self) -> BitVector {
        self.inverted_mask
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn tally(&self, input: BitVector) -> Tally {
        let effective = (input & self.active_mask) ^ self.inverted_mask;
        Tally {
            high: effective.count_ones(),
            total: self.active_mask.count_ones(),
        }
    }

    pub fn value(&self, input: BitVector) -> bool {
        let tally = self.tally(input);
        self.operator.apply(tally.high, tally.total)
    }
}
