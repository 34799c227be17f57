// Panel configuration.
//
// `PanelConfig` is a snapshot of every switch and knob on the panel plus the
// few deployment choices (cascade policy, trigger thresholds, pulse shape).
// The host owns it and hands a reference to `LogicMatrixEngine::process` each
// tick; the engine never stores it.
//
// Two ways in:
// - `PanelConfig::from_raw` maps the host's raw float parameters through the
//   total `from_raw` functions on each switch enum (round to nearest, clamp
//   to range). This is the path a plugin host uses every tick.
// - `PanelConfig::load` / `from_json_str` read a JSON patch file, used by the
//   offline renderer and tests. JSON input is validated; raw input cannot be
//   invalid.
//
// Matrix switches are indexed `matrix[operation][channel]`; co-mute switches
// `co_mute[accumulator][channel]`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::accumulator::Interval;
use crate::bit_vector::BitVector;
use crate::channel::{CascadeMode, MuteSwitch, SchmittThresholds};
use crate::error::ConfigError;
use crate::operation::{LogicOperation, MatrixSwitch, Operator, TargetSwitch};
use crate::output::PulseShape;
use crate::{NUM_ACCUMULATORS, NUM_CHANNELS, NUM_OPERATIONS};

/// Snap a raw parameter to one of `positions` integer positions. Rounds to
/// nearest and clamps; NaN maps to 0.
pub(crate) fn snap_switch(raw: f32, positions: u8) -> u8 {
    let max = positions.saturating_sub(1);
    // Float-to-int `as` saturates and maps NaN to 0.
    (raw.round().max(0.0) as u8).min(max)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Divide-by-two policy for unpatched channels.
    pub cascade_mode: CascadeMode,
    /// Hysteresis for patched channel inputs.
    pub thresholds: SchmittThresholds,
    /// Trigger output pulse width (seconds).
    pub pulse_seconds: f32,
    /// Trigger output level (volts).
    pub pulse_volts: f32,
    pub mute: [MuteSwitch; NUM_CHANNELS],
    pub matrix: [[MatrixSwitch; NUM_CHANNELS]; NUM_OPERATIONS],
    pub operators: [Operator; NUM_OPERATIONS],
    pub targets: [TargetSwitch; NUM_OPERATIONS],
    pub intervals: [Interval; NUM_ACCUMULATORS],
    /// Percentile knobs, each in `[0, 1]`.
    pub percentiles: [f32; NUM_ACCUMULATORS],
    pub co_mute: [[bool; NUM_CHANNELS]; NUM_ACCUMULATORS],
}

impl Default for PanelConfig {
    /// Factory panel: every switch centred, operators Or, intervals Or,
    /// percentiles at 0, no co-muting.
    fn default() -> Self {
        let pulse = PulseShape::default();
        PanelConfig {
            cascade_mode: CascadeMode::default(),
            thresholds: SchmittThresholds::default(),
            pulse_seconds: pulse.seconds,
            pulse_volts: pulse.volts,
            mute: [MuteSwitch::Unmuted; NUM_CHANNELS],
            matrix: [[MatrixSwitch::Muted; NUM_CHANNELS]; NUM_OPERATIONS],
            operators: [Operator::Or; NUM_OPERATIONS],
            targets: [TargetSwitch::Middle; NUM_OPERATIONS],
            intervals: [Interval::Or; NUM_ACCUMULATORS],
            percentiles: [0.0; NUM_ACCUMULATORS],
            co_mute: [[false; NUM_CHANNELS]; NUM_ACCUMULATORS],
        }
    }
}

impl PanelConfig {
    /// Read and validate a JSON panel file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(path = %path.display(), cascade = ?config.cascade_mode, "loaded panel config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PanelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let SchmittThresholds { low, high } = self.thresholds;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(ConfigError::Thresholds { low, high });
        }
        if !self.pulse_seconds.is_finite() || self.pulse_seconds <= 0.0 {
            return Err(ConfigError::PulseWidth(self.pulse_seconds));
        }
        for (accumulator, &value) in self.percentiles.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Percentile { accumulator, value });
            }
        }
        Ok(())
    }

    /// Map raw host parameters. Deployment settings (cascade mode,
    /// thresholds, pulse shape) are kept from `self`.
    pub fn with_raw(&self, raw: &RawPanelParams) -> Self {
        PanelConfig {
            mute: raw.mute.map(MuteSwitch::from_raw),
            matrix: raw.matrix.map(|row| row.map(MatrixSwitch::from_raw)),
            operators: raw.operators.map(Operator::from_raw),
            targets: raw.targets.map(TargetSwitch::from_raw),
            intervals: raw.intervals.map(Interval::from_raw),
            percentiles: raw.percentiles.map(|p| if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }),
            co_mute: raw.co_mute.map(|row| row.map(|v| v > 0.5)),
            ..self.clone()
        }
    }

    /// Raw parameters with factory deployment settings.
    pub fn from_raw(raw: &RawPanelParams) -> Self {
        PanelConfig::default().with_raw(raw)
    }

    pub fn pulse_shape(&self) -> PulseShape {
        PulseShape {
            seconds: self.pulse_seconds,
            volts: self.pulse_volts,
        }
    }

    /// Compile one matrix row.
    pub fn operation(&self, index: usize) -> LogicOperation {
        LogicOperation::from_switches(&self.matrix[index], self.operators[index], self.targets[index])
    }

    pub fn co_mute_mask(&self, accumulator: usize) -> BitVector {
        BitVector::from_bools(&self.co_mute[accumulator])
    }
}

/// The host's parameter values as plain floats, grouped by control.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPanelParams {
    pub mute: [f32; NUM_CHANNELS],
    pub matrix: [[f32; NUM_CHANNELS]; NUM_OPERATIONS],
    pub operators: [f32; NUM_OPERATIONS],
    pub targets: [f32; NUM_OPERATIONS],
    pub intervals: [f32; NUM_ACCUMULATORS],
    pub percentiles: [f32; NUM_ACCUMULATORS],
    pub co_mute: [[f32; NUM_CHANNELS]; NUM_ACCUMULATORS],
}
