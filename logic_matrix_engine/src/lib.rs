// logic_matrix_engine: per-sample logic-to-pitch resolution.
//
// A bank of binary input channels feeds a matrix of boolean operations. Each
// operation routes its result to one of a few accumulators, and each
// accumulator turns its tally into a pitch voltage. Rather than reading the
// matrix once, every accumulator searches over all variants of the input
// vector allowed by its co-mute mask, ranks them by resulting pitch, and picks
// one by percentile.
//
// Module overview:
// - `bit_vector.rs`:  BitVector: fixed-width channel mask (<= 8 bits).
// - `channel.rs`:     InputChannel normalization: Schmitt trigger, mute switch,
//                     and the two divide-by-two cascade policies.
// - `operation.rs`:   LogicOperation: masks, operator, target routing.
// - `comute.rs`:      InputVectorIterator: enumerates co-mute variants.
// - `accumulator.rs`: Interval table and pitch-per-hit voltages.
// - `matrix.rs`:      LogicMatrix: evaluates every operation for one vector.
// - `output.rs`:      Percentile selection, pulse generator, output state.
// - `engine.rs`:      LogicMatrixEngine: the per-tick orchestration.
// - `config.rs`:      PanelConfig: switch/knob snapshot, JSON loading.
// - `message.rs`:     LatticeMessage: record sent to the lattice display.
// - `error.rs`:       ConfigError.
//
// **Critical constraint: real-time.** Everything reachable from
// `LogicMatrixEngine::process` is allocation-free, non-blocking and a total
// function of its inputs plus the channel/output state carried between ticks.
// All storage is fixed-size arrays sized by the constants below.

pub mod accumulator;
pub mod bit_vector;
pub mod channel;
pub mod comute;
pub mod config;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod message;
pub mod operation;
pub mod output;

/// Number of binary input channels on the panel.
pub const NUM_CHANNELS: usize = 5;

/// Number of logic operations (matrix rows).
pub const NUM_OPERATIONS: usize = 6;

/// Number of accumulators (pitch outputs).
pub const NUM_ACCUMULATORS: usize = 3;

/// Widest channel bank a `BitVector` can describe.
pub const MAX_CHANNELS: usize = 8;

/// Largest number of variants a single co-mute search can produce.
pub const MAX_VARIANTS: usize = 1 << NUM_CHANNELS;

const _: () = assert!(NUM_CHANNELS <= MAX_CHANNELS);
