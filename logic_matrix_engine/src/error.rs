// Errors at the configuration boundary. The tick path itself has no failure
// modes; everything it reads has been validated here first.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read panel config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse panel config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Schmitt thresholds must be finite with low < high (low = {low}, high = {high})")]
    Thresholds { low: f32, high: f32 },
    #[error("Trigger pulse must be a positive, finite width (got {0} s)")]
    PulseWidth(f32),
    #[error("Percentile knob for accumulator {accumulator} is {value}, outside [0, 1]")]
    Percentile { accumulator: usize, value: f32 },
}
