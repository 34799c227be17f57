// Accumulator interval mapping.
//
// Each accumulator has a ten-position interval selector. Seven positions are
// just-intonation intervals: every high operation routed to the accumulator
// adds `log2(ratio)` volts (1 V/oct) to the chord pitch. The first three
// positions are logic modes that add nothing to the pitch and instead turn
// the accumulator's own tally into a gate or stepped voltage.

use serde::{Deserialize, Serialize};

use crate::config::snap_switch;

/// Gate level for the logic modes and the trigger output.
pub const GATE_VOLTS: f32 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// Gate high if any routed operation is high.
    #[default]
    Or,
    /// Gate high if every routed operation is high.
    And,
    /// Fraction of routed operations that are high, scaled to the gate level.
    Avg,
    WholeStep,
    MinorThird,
    MajorThird,
    PerfectFourth,
    PerfectFifth,
    MinorSeventh,
    Octave,
}

impl Interval {
    pub const ALL: [Interval; 10] = [
        Interval::Or,
        Interval::And,
        Interval::Avg,
        Interval::WholeStep,
        Interval::MinorThird,
        Interval::MajorThird,
        Interval::PerfectFourth,
        Interval::PerfectFifth,
        Interval::MinorSeventh,
        Interval::Octave,
    ];

    /// Map the interval knob (0..=9) to a selector position.
    pub fn from_raw(raw: f32) -> Self {
        Interval::ALL[snap_switch(raw, Interval::ALL.len() as u8) as usize]
    }

    /// Whether this position contributes to the chord pitch.
    pub fn is_pitch(self) -> bool {
        !matches!(self, Interval::Or | Interval::And | Interval::Avg)
    }

    /// Volts per hit, `log2` of the just ratio. Zero for the logic modes.
    pub fn volts(self) -> f32 {
        let volts: f64 = match self {
            Interval::Or | Interval::And | Interval::Avg => 0.0,
            Interval::WholeStep => 0.16992500144231237,    // log2(9/8)
            Interval::MinorThird => 0.2630344058337938,    // log2(6/5)
            Interval::MajorThird => 0.32192809488736235,   // log2(5/4)
            Interval::PerfectFourth => 0.4150374992788437, // log2(4/3)
            Interval::PerfectFifth => 0.5849625007211562,  // log2(3/2)
            Interval::MinorSeventh => 0.8073549220576041,  // log2(7/4)
            Interval::Octave => 1.0,
        };
        volts as f32
    }

    /// Nearest equal-tempered size in semitones, for note naming. Zero for
    /// the logic modes.
    pub fn semitones(self) -> i32 {
        match self {
            Interval::Or | Interval::And | Interval::Avg => 0,
            Interval::WholeStep => 2,
            Interval::MinorThird => 3,
            Interval::MajorThird => 4,
            Interval::PerfectFourth => 5,
            Interval::PerfectFifth => 7,
            Interval::MinorSeventh => 10,
            Interval::Octave => 12,
        }
    }
}

/// One accumulator's configuration for a tick: the selected interval plus
/// the CV offset patched into its interval input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    pub interval: Interval,
    pub cv_offset_volts: f32,
}

impl Accumulator {
    /// A non-finite CV (NaN from an unpatched host input, or infinity) reads
    /// as 0 V so it never reaches the chord pitch.
    pub fn new(interval: Interval, cv_offset_volts: f32) -> Self {
        Accumulator {
            interval,
            cv_offset_volts: if cv_offset_volts.is_finite() { cv_offset_volts } else { 0.0 },
        }
    }

    pub fn is_pitch(&self) -> bool {
        self.interval.is_pitch()
    }

    /// Volts added to the chord pitch per high operation. The CV offset only
    /// applies to pitch intervals.
    pub fn pitch_per_hit(&self) -> f32 {
        if self.is_pitch() {
            self.interval.volts() + self.cv_offset_volts
        } else {
            0.0
        }
    }

    /// Output voltage for a logic-mode accumulator given its own tally.
    /// Pitch intervals return `pitch_per_hit * high`.
    pub fn tally_voltage(&self, high: u32, total: u32) -> f32 {
        match self.interval {
            Interval::Or => gate(high > 0),
            Interval::And => gate(high == total),
            Interval::Avg => {
                if total == 0 {
                    0.0
                } else {
                    GATE_VOLTS * high as f32 / total as f32
                }
            }
            _ => self.pitch_per_hit() * high as f32,
        }
    }
}

fn gate(high: bool) -> f32 {
    if high { GATE_VOLTS } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn test_volts_are_log2_ratios() {
        assert_close(Interval::WholeStep.volts(), (9.0f32 / 8.0).log2());
        assert_close(Interval::MinorThird.volts(), (6.0f32 / 5.0).log2());
        assert_close(Interval::MajorThird.volts(), (5.0f32 / 4.0).log2());
        assert_close(Interval::PerfectFourth.volts(), (4.0f32 / 3.0).log2());
        assert_close(Interval::PerfectFifth.volts(), (3.0f32 / 2.0).log2());
        assert_close(Interval::MinorSeventh.volts(), (7.0f32 / 4.0).log2());
        assert_close(Interval::Octave.volts(), 1.0);
    }

    #[test]
    fn test_logic_modes_contribute_no_pitch() {
        for interval in [Interval::Or, Interval::And, Interval::Avg] {
            let acc = Accumulator::new(interval, 0.5);
            assert!(!acc.is_pitch());
            assert_eq!(acc.pitch_per_hit(), 0.0);
        }
    }

    #[test]
    fn test_cv_offset_adds_to_pitch_per_hit() {
        let acc = Accumulator::new(Interval::Octave, -0.25);
        assert_close(acc.pitch_per_hit(), 0.75);
        assert_close(acc.tally_voltage(2, 4), 1.5);
    }

    #[test]
    fn test_non_finite_cv_reads_as_zero() {
        for cv in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let acc = Accumulator::new(Interval::Octave, cv);
            assert_eq!(acc.cv_offset_volts, 0.0);
            assert_eq!(acc.pitch_per_hit(), 1.0);
            assert_eq!(acc.tally_voltage(0, 2), 0.0);
        }
    }

    #[test]
    fn test_tally_voltages() {
        let or = Accumulator::new(Interval::Or, 0.0);
        assert_eq!(or.tally_voltage(0, 2), 0.0);
        assert_eq!(or.tally_voltage(1, 2), GATE_VOLTS);

        let and = Accumulator::new(Interval::And, 0.0);
        assert_eq!(and.tally_voltage(1, 2), 0.0);
        assert_eq!(and.tally_voltage(2, 2), GATE_VOLTS);

        let avg = Accumulator::new(Interval::Avg, 0.0);
        assert_close(avg.tally_voltage(1, 4), 1.25);
    }

    #[test]
    fn test_avg_with_no_routed_operations_is_zero() {
        let avg = Accumulator::new(Interval::Avg, 0.0);
        let v = avg.tally_voltage(0, 0);
        assert_eq!(v, 0.0);
        assert!(!v.is_nan());
    }

    #[test]
    fn test_interval_from_raw() {
        assert_eq!(Interval::from_raw(0.0), Interval::Or);
        assert_eq!(Interval::from_raw(7.0), Interval::PerfectFifth);
        assert_eq!(Interval::from_raw(9.4), Interval::Octave);
        assert_eq!(Interval::from_raw(42.0), Interval::Octave);
        assert_eq!(Interval::PerfectFifth.semitones(), 7);
    }
}
