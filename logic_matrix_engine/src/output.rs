// Percentile selection and output state.
//
// For a pitch accumulator, each tick:
//
//   1. Enumerate every variant of the live vector allowed by the
//      accumulator's co-mute mask (`comute.rs`).
//   2. Evaluate each variant through the full matrix (`matrix.rs`).
//   3. Stable-sort the variants ascending by chord pitch. Equal pitches keep
//      enumeration order, so the selection is deterministic.
//   4. Pick index `clamp(floor(p * N), 0, N - 1)` for percentile `p`.
//
// `VariantRanking` holds the sorted set in a fixed buffer (at most
// `MAX_VARIANTS` entries) and sorts with an insertion sort, which is stable
// and allocation-free.
//
// `Output` carries the only per-accumulator state between ticks: the last
// emitted value and the trigger pulse generator. A trigger fires whenever
// the emitted value changes.

use crate::MAX_VARIANTS;
use crate::bit_vector::BitVector;
use crate::comute::InputVectorIterator;
use crate::matrix::{LogicMatrix, MatrixEvalResult};

/// Percentile CV scale: 10 V sweeps the full range.
pub const PERCENTILE_CV_VOLTS_PER_UNIT: f32 = 10.0;

/// Default trigger pulse width in seconds.
pub const DEFAULT_PULSE_SECONDS: f32 = 0.01;

/// Combine the percentile knob and CV into a value in `[0, 1]`. Out-of-range
/// values clamp; NaN reads as 0.
pub fn effective_percentile(knob: f32, cv_volts: f32) -> f32 {
    let p = knob + cv_volts / PERCENTILE_CV_VOLTS_PER_UNIT;
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Index into a ranked set of `len` variants for percentile `p`.
pub fn percentile_index(p: f32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    // `as usize` saturates, and floor of a non-negative value is exact.
    let index = (p * len as f32).floor() as usize;
    index.min(len - 1)
}

/// One evaluated variant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RankedVariant {
    pub vector: BitVector,
    /// Position in enumeration order.
    pub ordinal: usize,
    pub result: MatrixEvalResult,
}

/// Every variant for one accumulator's search, sorted by pitch.
#[derive(Clone, Debug)]
pub struct VariantRanking {
    variants: [RankedVariant; MAX_VARIANTS],
    len: usize,
}

impl Default for VariantRanking {
    fn default() -> Self {
        VariantRanking {
            variants: [RankedVariant::default(); MAX_VARIANTS],
            len: 0,
        }
    }
}

impl VariantRanking {
    /// Enumerate, evaluate and sort every variant of `live` under
    /// `co_mute_mask`. Reuses this buffer.
    pub fn rank(&mut self, matrix: &LogicMatrix, co_mute_mask: BitVector, live: BitVector) {
        self.len = 0;
        let mut it = InputVectorIterator::new(co_mute_mask, live);
        while !it.done() {
            let vector = it.get();
            let candidate = RankedVariant {
                vector,
                ordinal: it.ordinal(),
                result: matrix.evaluate(vector),
            };
            self.insert_sorted(candidate);
            it.advance();
        }
    }

    // Insertion from the back: a new entry only moves past strictly higher
    // pitches, so ties stay in enumeration order.
    fn insert_sorted(&mut self, candidate: RankedVariant) {
        let mut i = self.len;
        while i > 0
            && self.variants[i - 1]
                .result
                .pitch
                .total_cmp(&candidate.result.pitch)
                .is_gt()
        {
            self.variants[i] = self.variants[i - 1];
            i -= 1;
        }
        self.variants[i] = candidate;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[RankedVariant] {
        &self.variants[..self.len]
    }

    /// The variant at percentile `p`. `None` only before the first `rank`.
    pub fn select(&self, p: f32) -> Option<&RankedVariant> {
        if self.is_empty() {
            return None;
        }
        Some(&self.variants[percentile_index(p, self.len)])
    }
}

/// Fixed-width trigger pulse. `trigger` (re)starts the pulse; `process`
/// reports whether the pulse is still running and consumes `dt` seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PulseGenerator {
    remaining: f32,
}

impl PulseGenerator {
    pub fn trigger(&mut self, duration: f32) {
        if duration > self.remaining {
            self.remaining = duration;
        }
    }

    pub fn process(&mut self, dt: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }
}

/// Voltages emitted for one accumulator on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutputVoltages {
    pub value: f32,
    pub trigger: f32,
}

/// Trigger pulse shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseShape {
    pub seconds: f32,
    pub volts: f32,
}

impl Default for PulseShape {
    fn default() -> Self {
        PulseShape {
            seconds: DEFAULT_PULSE_SECONDS,
            volts: crate::accumulator::GATE_VOLTS,
        }
    }
}

/// Per-accumulator state carried between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Output {
    value: f32,
    pulse: PulseGenerator,
}

impl Output {
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Emit `value` for this tick. Returns the value and trigger voltages and
    /// whether the value changed.
    pub fn set_value(&mut self, value: f32, dt: f32, shape: PulseShape) -> (OutputVoltages, bool) {
        let changed = value != self.value;
        self.value = value;
        if changed {
            self.pulse.trigger(shape.seconds);
        }
        let trigger = if self.pulse.process(dt) { shape.volts } else { 0.0 };
        (OutputVoltages { value, trigger }, changed)
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.pulse.reset();
    }
}
