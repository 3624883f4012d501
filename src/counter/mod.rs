pub mod calibration;
pub mod manual;
pub mod physics;

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use calibration::{CalibrationSet, CalibrationStore, Checkpoint};
pub use manual::ManualModel;
pub use physics::{PhysicsModel, PhysicsParams};

#[derive(Debug, Error)]
pub enum CounterError {
    /// Negative elapsed time is a caller bug, never clamped away.
    #[error("elapsed time must be non-negative (got {0})")]
    InvalidInput(f64),

    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("calibration file not found: {}", path.display())]
    StoreNotFound { path: PathBuf },

    #[error("calibration file {} is unreadable: {reason}", path.display())]
    StoreUnreadable { path: PathBuf, reason: String },

    #[error("could not write calibration file {}: {reason}", path.display())]
    StoreWriteFailed { path: PathBuf, reason: String },

    #[error("counter rate must be positive and finite (got {0})")]
    InvalidRate(f64),
}

/// How the deck's counter readout is derived from elapsed recording time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterMode {
    /// Fixed counts-per-second ratio.
    Static,
    /// Interpolation between hand-measured checkpoints.
    Manual,
    /// Reel-radius physics simulation. Older profile files call this
    /// mode "auto".
    #[serde(alias = "auto")]
    Physics,
}

impl CounterMode {
    pub fn label(self) -> &'static str {
        match self {
            CounterMode::Static => "Static Linear",
            CounterMode::Manual => "Manual Calibrated",
            CounterMode::Physics => "Reel Physics",
        }
    }
}

/// Fixed-ratio counter: the readout advances `rate` units per second no
/// matter how much tape sits on the reel.
pub struct StaticModel {
    rate: f64,
}

impl StaticModel {
    pub fn new(rate: f64) -> Result<Self, CounterError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CounterError::InvalidRate(rate));
        }
        Ok(Self { rate })
    }

    pub fn counter_at(&self, elapsed: f64) -> Result<f64, CounterError> {
        if elapsed < 0.0 {
            return Err(CounterError::InvalidInput(elapsed));
        }
        Ok(self.rate * elapsed)
    }
}

pub enum CounterModel {
    Static(StaticModel),
    Manual(ManualModel),
    Physics(PhysicsModel),
}

impl CounterModel {
    pub fn counter_at(&self, elapsed: f64) -> Result<f64, CounterError> {
        match self {
            CounterModel::Static(m) => m.counter_at(elapsed),
            CounterModel::Manual(m) => m.counter_at(elapsed),
            CounterModel::Physics(m) => m.counter_at(elapsed),
        }
    }
}

/// Everything one session needs to build its model. Calibration is loaded
/// by the caller beforehand; construction itself does no I/O.
pub enum CounterSetup {
    Static { rate: f64 },
    Manual { calibration: CalibrationSet },
    Physics(PhysicsParams),
}

/// Selects and owns exactly one counter model for the lifetime of a
/// recording session. The model never changes after construction, so the
/// session can be queried from any thread without locking.
pub struct CounterSession {
    mode: CounterMode,
    model: CounterModel,
}

impl CounterSession {
    pub fn new(setup: CounterSetup) -> Result<Self, CounterError> {
        let (mode, model) = match setup {
            CounterSetup::Static { rate } => (
                CounterMode::Static,
                CounterModel::Static(StaticModel::new(rate)?),
            ),
            CounterSetup::Manual { calibration } => (
                CounterMode::Manual,
                CounterModel::Manual(ManualModel::new(calibration)?),
            ),
            CounterSetup::Physics(params) => (
                CounterMode::Physics,
                CounterModel::Physics(PhysicsModel::new(params)),
            ),
        };
        Ok(Self { mode, model })
    }

    pub fn counter_at(&self, elapsed: f64) -> Result<f64, CounterError> {
        self.model.counter_at(elapsed)
    }

    pub fn mode(&self) -> CounterMode {
        self.mode
    }
}

/// Render a counter value the way the deck's window shows it: rounded,
/// four digits, zero padded. Values past 9999 keep their extra digits.
pub fn format_counter(value: f64) -> String {
    format!("{:04}", value.round().max(0.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_set() -> CalibrationSet {
        CalibrationSet::from_points(&[(60.0, 85.0), (300.0, 422.0), (1200.0, 1690.0), (1800.0, 2534.0)])
    }

    #[test]
    fn static_counter_is_rate_times_time() {
        let model = StaticModel::new(1.42).unwrap();
        assert_eq!(model.counter_at(0.0).unwrap(), 0.0);
        assert!((model.counter_at(100.0).unwrap() - 142.0).abs() < 1e-9);
        assert!((model.counter_at(1800.0).unwrap() - 2556.0).abs() < 1e-9);
    }

    #[test]
    fn static_counter_is_strictly_monotonic() {
        let model = StaticModel::new(0.7).unwrap();
        let mut prev = -1.0;
        for i in 0..200 {
            let v = model.counter_at(i as f64 * 9.5).unwrap();
            assert!(v > prev || i == 0);
            prev = v;
        }
    }

    #[test]
    fn static_rejects_bad_rates() {
        assert!(matches!(StaticModel::new(0.0), Err(CounterError::InvalidRate(_))));
        assert!(matches!(StaticModel::new(-1.0), Err(CounterError::InvalidRate(_))));
        assert!(matches!(StaticModel::new(f64::NAN), Err(CounterError::InvalidRate(_))));
        assert!(matches!(StaticModel::new(f64::INFINITY), Err(CounterError::InvalidRate(_))));
    }

    #[test]
    fn every_variant_rejects_negative_time() {
        let sessions = [
            CounterSession::new(CounterSetup::Static { rate: 1.0 }).unwrap(),
            CounterSession::new(CounterSetup::Manual { calibration: fixture_set() }).unwrap(),
            CounterSession::new(CounterSetup::Physics(PhysicsParams {
                linear_speed: 47.625,
                hub_radius: 10.0,
                tape_thickness: 0.016,
                reference_rate: 1.4,
                total_duration: 1800.0,
            }))
            .unwrap(),
        ];
        for session in &sessions {
            assert!(matches!(
                session.counter_at(-1.0),
                Err(CounterError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn session_exposes_the_selected_mode() {
        let session = CounterSession::new(CounterSetup::Manual { calibration: fixture_set() }).unwrap();
        assert_eq!(session.mode(), CounterMode::Manual);
        // Same query surface regardless of variant.
        assert!((session.counter_at(300.0).unwrap() - 422.0).abs() < 1e-9);
    }

    #[test]
    fn counter_formatting_pads_to_four_digits() {
        assert_eq!(format_counter(0.0), "0000");
        assert_eq!(format_counter(7.4), "0007");
        assert_eq!(format_counter(7.5), "0008");
        assert_eq!(format_counter(2534.0), "2534");
        assert_eq!(format_counter(12345.0), "12345");
    }
}
