// Per-tick orchestration.
//
// `LogicMatrixEngine` owns the state that survives between samples (channel
// state, output values and pulses) plus a scratch buffer for variant
// ranking. Everything else arrives as snapshots: the panel (`PanelConfig`)
// and the jacks (`TickInput`). `process` runs one sample:
//
//   1. Normalize channels 0..N in index order. Cascaded channels read the
//      previous channel's state from *this* tick, so this must finish before
//      anything reads channel values.
//   2. Compile the panel into a `LogicMatrix` (masks, operators, routing,
//      interval + CV per accumulator). Cheap enough to redo every tick.
//   3. Evaluate the live vector once for the equation lights and the
//      logic-mode accumulators.
//   4. For each pitch accumulator, rank every co-mute variant and select by
//      percentile. Logic-mode accumulators emit their own live tally voltage.
//   5. Update outputs (value + change trigger) and fill the lattice message.
//
// No allocation, no locking, no I/O. The only logging is `trace!` on output
// changes, which compiles to a level check when tracing is off.

use tracing::{debug, trace};

use crate::accumulator::Accumulator;
use crate::bit_vector::BitVector;
use crate::channel::{ChannelInput, InputChannel};
use crate::config::PanelConfig;
use crate::matrix::LogicMatrix;
use crate::message::LatticeMessage;
use crate::output::{Output, OutputVoltages, RankedVariant, VariantRanking, effective_percentile};
use crate::{NUM_ACCUMULATORS, NUM_CHANNELS, NUM_OPERATIONS};

/// Jack values for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    pub channels: [ChannelInput; NUM_CHANNELS],
    /// Interval CV per accumulator, added to its volts-per-hit.
    pub interval_cv: [f32; NUM_ACCUMULATORS],
    /// Percentile CV per accumulator; 10 V spans the whole range.
    pub percentile_cv: [f32; NUM_ACCUMULATORS],
}

/// Everything the host writes out after one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutput {
    pub channel_values: [bool; NUM_CHANNELS],
    pub channel_changed: [bool; NUM_CHANNELS],
    /// Row results for the live vector.
    pub operation_values: [bool; NUM_OPERATIONS],
    pub outputs: [OutputVoltages; NUM_ACCUMULATORS],
    /// Whether each output's value changed (and retriggered) this tick.
    pub output_changed: [bool; NUM_ACCUMULATORS],
    pub message: LatticeMessage,
}

#[derive(Clone, Debug, Default)]
pub struct LogicMatrixEngine {
    channels: [InputChannel; NUM_CHANNELS],
    outputs: [Output; NUM_ACCUMULATORS],
    ranking: VariantRanking,
}

impl LogicMatrixEngine {
    pub fn new() -> Self {
        debug!(
            channels = NUM_CHANNELS,
            operations = NUM_OPERATIONS,
            accumulators = NUM_ACCUMULATORS,
            "logic matrix engine created"
        );
        LogicMatrixEngine::default()
    }

    /// Back to the power-on state.
    pub fn reset(&mut self) {
        debug!("logic matrix engine reset");
        self.channels = [InputChannel::default(); NUM_CHANNELS];
        for output in &mut self.outputs {
            output.reset();
        }
    }

    pub fn channels(&self) -> &[InputChannel; NUM_CHANNELS] {
        &self.channels
    }

    pub fn outputs(&self) -> &[Output; NUM_ACCUMULATORS] {
        &self.outputs
    }

    /// Current channel values as a vector.
    pub fn live_vector(&self) -> BitVector {
        BitVector::from_bools(&self.channels.map(|c| c.value()))
    }

    /// Run one sample. `dt` is the sample period in seconds.
    pub fn process(&mut self, panel: &PanelConfig, input: &TickInput, dt: f32) -> TickOutput {
        self.normalize_channels(panel, input);

        let live = self.live_vector();
        let matrix = compile(panel, input);
        let live_result = matrix.evaluate(live);
        let live_variant = RankedVariant {
            vector: live,
            ordinal: 0,
            result: live_result,
        };
        let shape = panel.pulse_shape();

        let mut out = TickOutput {
            channel_values: self.channels.map(|c| c.value()),
            channel_changed: self.channels.map(|c| c.changed()),
            operation_values: matrix.operation_values(live),
            ..TickOutput::default()
        };

        for acc in 0..NUM_ACCUMULATORS {
            let accumulator = matrix.accumulators[acc];
            let winner = if accumulator.is_pitch() {
                self.ranking.rank(&matrix, panel.co_mute_mask(acc), live);
                let p = effective_percentile(panel.percentiles[acc], input.percentile_cv[acc]);
                self.ranking.select(p).copied().unwrap_or(live_variant)
            } else {
                live_variant
            };
            let value = if accumulator.is_pitch() {
                winner.result.pitch
            } else {
                accumulator.tally_voltage(
                    u32::from(live_result.high[acc]),
                    u32::from(live_result.total[acc]),
                )
            };

            let (voltages, changed) = self.outputs[acc].set_value(value, dt, shape);
            if changed {
                trace!(accumulator = acc, value, variant = winner.vector.bits(), "output changed");
            }
            out.outputs[acc] = voltages;
            out.output_changed[acc] = changed;

            out.message.interval_semitones[acc] = accumulator.interval.semitones();
            out.message.position[acc] = winner.result.high.map(i32::from);
            out.message.winning_bits[acc] = winner.vector.to_array();
        }

        out
    }

    fn normalize_channels(&mut self, panel: &PanelConfig, input: &TickInput) {
        for i in 0..NUM_CHANNELS {
            let prev = if i > 0 { Some(self.channels[i - 1]) } else { None };
            self.channels[i].process(
                input.channels[i],
                panel.mute[i],
                prev.as_ref(),
                panel.cascade_mode,
                panel.thresholds,
            );
        }
    }
}

/// The panel and this tick's CVs as a matrix.
fn compile(panel: &PanelConfig, input: &TickInput) -> LogicMatrix {
    LogicMatrix::new(
        std::array::from_fn(|i| panel.operation(i)),
        std::array::from_fn(|a| Accumulator::new(panel.intervals[a], input.interval_cv[a])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{GATE_VOLTS, Interval};
    use crate::channel::MuteSwitch;
    use crate::operation::{MatrixSwitch, Operator, TargetSwitch};

    const DT: f32 = 1.0 / 48_000.0;

    fn high_input(channels: usize) -> TickInput {
        let mut input = TickInput::default();
        for ch in input.channels.iter_mut().take(channels) {
            *ch = ChannelInput::patched(5.0);
        }
        for ch in input.channels.iter_mut().skip(channels) {
            *ch = ChannelInput::patched(0.0);
        }
        input
    }

    #[test]
    fn test_fresh_engine_is_silent() {
        let mut engine = LogicMatrixEngine::new();
        let panel = PanelConfig::default();
        let out = engine.process(&panel, &TickInput::default(), DT);
        assert_eq!(out.channel_values, [false; NUM_CHANNELS]);
        // Factory rows have no participants; Or is false, so the Or gates are low.
        assert_eq!(out.operation_values, [false; NUM_OPERATIONS]);
        for v in out.outputs {
            assert_eq!(v.value, 0.0);
            assert_eq!(v.trigger, 0.0);
        }
        assert_eq!(out.message, LatticeMessage::default());
    }

    #[test]
    fn test_logic_mode_gate_follows_live_tally() {
        let mut panel = PanelConfig::default();
        panel.matrix[0][0] = MatrixSwitch::Normal;
        panel.targets = [TargetSwitch::Up; NUM_OPERATIONS];
        panel.intervals[0] = Interval::Or;

        let mut engine = LogicMatrixEngine::new();
        let out = engine.process(&panel, &high_input(1), DT);
        assert!(out.operation_values[0]);
        assert_eq!(out.outputs[0].value, GATE_VOLTS);
        assert!(out.output_changed[0]);
        assert_eq!(out.outputs[0].trigger, GATE_VOLTS);

        let out = engine.process(&panel, &high_input(0), DT);
        assert_eq!(out.outputs[0].value, 0.0);
    }

    #[test]
    fn test_avg_mode_with_nothing_routed_is_zero() {
        let mut panel = PanelConfig::default();
        panel.intervals = [Interval::Avg; NUM_ACCUMULATORS];
        panel.targets = [TargetSwitch::Up; NUM_OPERATIONS];
        let mut engine = LogicMatrixEngine::new();
        let out = engine.process(&panel, &high_input(3), DT);
        // Nothing routes to accumulators 1 and 2.
        assert_eq!(out.outputs[1].value, 0.0);
        assert_eq!(out.outputs[2].value, 0.0);
        // All six rows route to accumulator 0, none high.
        assert_eq!(out.outputs[0].value, 0.0);
    }

    #[test]
    fn test_mute_switch_overrides_jack() {
        let mut panel = PanelConfig::default();
        panel.mute[0] = MuteSwitch::MuteDown;
        panel.mute[1] = MuteSwitch::MuteUp;
        let mut engine = LogicMatrixEngine::new();
        let out = engine.process(&panel, &high_input(1), DT);
        assert!(!out.channel_values[0]);
        assert!(out.channel_values[1]);
        assert!(out.channel_changed[1]);
    }

    #[test]
    fn test_pitch_output_and_message() {
        // Row 0: Or over channel 0 into accumulator 0 (octave).
        let mut panel = PanelConfig::default();
        panel.matrix[0][0] = MatrixSwitch::Normal;
        panel.operators[0] = Operator::Or;
        panel.targets = [TargetSwitch::Middle; NUM_OPERATIONS];
        panel.targets[0] = TargetSwitch::Up;
        panel.intervals = [Interval::Octave, Interval::PerfectFifth, Interval::Octave];

        let mut engine = LogicMatrixEngine::new();
        let out = engine.process(&panel, &high_input(1), DT);
        assert_eq!(out.outputs[0].value, 1.0);
        assert_eq!(out.message.position[0], [1, 0, 0]);
        assert_eq!(out.message.winning_bits[0], [1, 0, 0, 0, 0]);
        assert_eq!(out.message.interval_semitones, [12, 7, 12]);
    }

    #[test]
    fn test_non_finite_interval_cv_holds_steady() {
        let mut panel = PanelConfig::default();
        panel.matrix[0][0] = MatrixSwitch::Normal;
        panel.targets[0] = TargetSwitch::Up;
        panel.intervals[0] = Interval::Octave;
        panel.co_mute[0][1] = true;

        for cv in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut engine = LogicMatrixEngine::new();
            let mut input = high_input(1);
            input.interval_cv[0] = cv;

            let first = engine.process(&panel, &input, DT);
            assert_eq!(first.outputs[0].value, 1.0, "cv {cv}");
            assert!(first.output_changed[0]);

            let retriggers = (0..1000)
                .map(|_| engine.process(&panel, &input, DT))
                .filter(|out| {
                    assert!(out.outputs[0].value.is_finite(), "cv {cv}");
                    out.output_changed[0]
                })
                .count();
            assert_eq!(retriggers, 0, "cv {cv}");
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut engine = LogicMatrixEngine::new();
        let panel = PanelConfig::default();
        engine.process(&panel, &high_input(2), DT);
        assert!(engine.channels()[0].value());
        engine.reset();
        assert!(!engine.channels()[0].value());
        assert_eq!(engine.live_vector(), BitVector::EMPTY);
        assert_eq!(engine.outputs()[0].value(), 0.0);
    }
}
