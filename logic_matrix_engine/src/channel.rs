// Input channel normalization.
//
// Every tick each channel produces exactly one boolean. The source of that
// boolean depends on the channel's wiring:
//
// - Mute switch up/down: forced high/low, counter frozen.
// - Cable connected: Schmitt trigger on the voltage; rising edges increment
//   the channel's counter.
// - No cable, channel > 0: divide-by-two of the previous channel, using one
//   of the two `CascadeMode` policies.
// - No cable, channel 0: hold the previous value.
//
// Channels must be processed in index order within a tick, since a cascaded
// channel reads its predecessor's *current-tick* state. See
// `engine.rs::normalize_channels`.

use serde::{Deserialize, Serialize};

use crate::config::snap_switch;

/// Three-position mute switch next to each input jack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MuteSwitch {
    /// Forced low.
    MuteDown,
    #[default]
    Unmuted,
    /// Forced high.
    MuteUp,
}

impl MuteSwitch {
    /// Map a raw switch parameter (0, 1, 2) to a position.
    pub fn from_raw(raw: f32) -> Self {
        match snap_switch(raw, 3) {
            0 => MuteSwitch::MuteDown,
            1 => MuteSwitch::Unmuted,
            _ => MuteSwitch::MuteUp,
        }
    }

    /// The forced value, or `None` when the channel follows its source.
    pub fn forced_value(self) -> Option<bool> {
        match self {
            MuteSwitch::MuteDown => Some(false),
            MuteSwitch::Unmuted => None,
            MuteSwitch::MuteUp => Some(true),
        }
    }
}

/// How an unpatched channel derives its value from the channel before it.
///
/// The two policies diverge once the upstream channel is re-patched or muted
/// mid-count, so a deployment picks one and keeps it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CascadeMode {
    /// Flip whenever the previous channel went low-to-high this tick.
    EdgeFlip,
    /// Read bit 0 of the previous channel's counter and forward the counter
    /// shifted right by one, forming a ripple binary counter.
    #[default]
    CounterForwarding,
}

/// Hysteresis thresholds for patched inputs, in volts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchmittThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for SchmittThresholds {
    fn default() -> Self {
        SchmittThresholds {
            low: 0.9,
            high: 1.0,
        }
    }
}

/// Two-threshold comparator. Goes high at or above `high`, low at or below
/// `low`, and otherwise keeps its state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchmittTrigger {
    high: bool,
}

impl SchmittTrigger {
    /// Feed one sample. Returns `true` on a low-to-high transition.
    pub fn process(&mut self, voltage: f32, thresholds: SchmittThresholds) -> bool {
        if self.high {
            if voltage <= thresholds.low {
                self.high = false;
            }
            false
        } else if voltage >= thresholds.high {
            self.high = true;
            true
        } else {
            false
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

/// One channel's jack snapshot for a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelInput {
    pub connected: bool,
    pub voltage: f32,
}

impl ChannelInput {
    pub fn patched(voltage: f32) -> Self {
        ChannelInput {
            connected: true,
            voltage,
        }
    }

    pub fn unpatched() -> Self {
        ChannelInput::default()
    }
}

/// Per-channel state carried between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputChannel {
    value: bool,
    counter: u32,
    changed: bool,
    trigger: SchmittTrigger,
}

impl InputChannel {
    pub fn value(&self) -> bool {
        self.value
    }

    /// Rising-edge count (patched) or forwarded count (cascaded).
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether the value differs from the previous tick's.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// True if the channel went low-to-high this tick.
    pub fn rose(&self) -> bool {
        self.value && self.changed
    }

    /// Advance one tick. `prev` is the previous channel's state *after* its
    /// own update this tick, or `None` for channel 0.
    pub fn process(
        &mut self,
        input: ChannelInput,
        mute: MuteSwitch,
        prev: Option<&InputChannel>,
        mode: CascadeMode,
        thresholds: SchmittThresholds,
    ) {
        let old_value = self.value;

        if let Some(forced) = mute.forced_value() {
            self.value = forced;
        } else if input.connected {
            if self.trigger.process(input.voltage, thresholds) {
                self.counter = self.counter.wrapping_add(1);
            }
            self.value = self.trigger.is_high();
        } else if let Some(prev) = prev {
            match mode {
                CascadeMode::EdgeFlip => {
                    if prev.rose() {
                        self.value = !self.value;
                    }
                }
                CascadeMode::CounterForwarding => {
                    self.value = prev.counter & 1 == 1;
                    self.counter = prev.counter >> 1;
                }
            }
        }

        self.changed = self.value != old_value;
    }
}
