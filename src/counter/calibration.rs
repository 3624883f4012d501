use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::counter::CounterError;

/// One measured (elapsed time, counter reading) pair taken while timing the
/// deck against a stopwatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub time_seconds: f64,
    pub counter: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A deck's measured checkpoints plus free-form description. The metadata
/// never affects the mapping; it rides along for tracklist headers and for
/// people editing the file by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_date: Option<String>,
    pub checkpoints: Vec<Checkpoint>,
}

impl CalibrationSet {
    #[cfg(test)]
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            checkpoints: points
                .iter()
                .map(|&(time_seconds, counter)| Checkpoint {
                    time_seconds,
                    counter,
                    note: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// File ordering is not significant; everything downstream works on the
    /// time-sorted list.
    pub fn sort(&mut self) {
        self.checkpoints
            .sort_by(|a, b| a.time_seconds.total_cmp(&b.time_seconds));
    }

    /// Checks the checkpoint invariants on an already sorted set: at least
    /// one point, positive finite times with no duplicates, and counter
    /// values that never decrease. Diagnostics name the offending
    /// checkpoint by its position in time order.
    pub fn validate(&self) -> Result<(), CounterError> {
        if self.checkpoints.is_empty() {
            return Err(CounterError::InvalidCalibration(
                "no checkpoints measured".to_string(),
            ));
        }
        for (i, cp) in self.checkpoints.iter().enumerate() {
            if !cp.time_seconds.is_finite() || cp.time_seconds <= 0.0 {
                return Err(CounterError::InvalidCalibration(format!(
                    "checkpoint {}: time must be a positive number of seconds (got {})",
                    i + 1,
                    cp.time_seconds
                )));
            }
            if !cp.counter.is_finite() || cp.counter < 0.0 {
                return Err(CounterError::InvalidCalibration(format!(
                    "checkpoint {}: counter must be non-negative (got {})",
                    i + 1,
                    cp.counter
                )));
            }
        }
        for (i, pair) in self.checkpoints.windows(2).enumerate() {
            if pair[1].time_seconds == pair[0].time_seconds {
                return Err(CounterError::InvalidCalibration(format!(
                    "checkpoints {} and {} share the same time ({}s)",
                    i + 1,
                    i + 2,
                    pair[0].time_seconds
                )));
            }
            if pair[1].counter < pair[0].counter {
                return Err(CounterError::InvalidCalibration(format!(
                    "counter falls from {} to {} between {}s and {}s",
                    pair[0].counter, pair[1].counter, pair[0].time_seconds, pair[1].time_seconds
                )));
            }
        }
        Ok(())
    }
}

/// Reads and writes one calibration file. Distinct decks use distinct
/// paths; the store never merges, a save replaces the file wholesale.
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads, sorts, and validates. A missing file is reported separately
    /// from a garbled one so the caller can suggest recalibration.
    pub fn load(&self) -> Result<CalibrationSet, CounterError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CounterError::StoreNotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => {
                return Err(CounterError::StoreUnreadable {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };
        let mut set: CalibrationSet =
            serde_json::from_str(&json).map_err(|e| CounterError::StoreUnreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        set.sort();
        set.validate()?;
        Ok(set)
    }

    /// Validates before touching the file; invalid data never reaches disk.
    /// Checkpoints are written in time order.
    pub fn save(&self, set: &CalibrationSet) -> Result<(), CounterError> {
        let mut sorted = set.clone();
        sorted.sort();
        sorted.validate()?;
        let json =
            serde_json::to_string_pretty(&sorted).map_err(|e| CounterError::StoreWriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        std::fs::write(&self.path, json).map_err(|e| CounterError::StoreWriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CalibrationStore {
        CalibrationStore::new(dir.path().join("counter_calibration.json"))
    }

    #[test]
    fn round_trip_preserves_every_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut set = CalibrationSet::from_points(&[(60.0, 85.0), (300.0, 422.0), (1800.0, 2534.0)]);
        set.deck_model = Some("AIWA AD-F780".to_string());
        set.tape_type = Some("Type II".to_string());

        store.save(&set).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.checkpoints, set.checkpoints);
        assert_eq!(loaded.deck_model.as_deref(), Some("AIWA AD-F780"));
        assert_eq!(loaded.tape_type.as_deref(), Some("Type II"));
    }

    #[test]
    fn load_sorts_checkpoints_recorded_out_of_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let json = r#"{
            "checkpoints": [
                {"time_seconds": 1800, "counter": 2534},
                {"time_seconds": 60, "counter": 85},
                {"time_seconds": 300, "counter": 422}
            ]
        }"#;
        std::fs::write(store.path(), json).unwrap();

        let set = store.load().unwrap();
        let times: Vec<f64> = set.checkpoints.iter().map(|c| c.time_seconds).collect();
        assert_eq!(times, vec![60.0, 300.0, 1800.0]);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(
            store.load(),
            Err(CounterError::StoreNotFound { .. })
        ));
    }

    #[test]
    fn garbled_file_is_reported_as_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "counter: 85 at one minute").unwrap();
        assert!(matches!(
            store.load(),
            Err(CounterError::StoreUnreadable { .. })
        ));
    }

    #[test]
    fn duplicate_times_are_rejected_on_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let set = CalibrationSet::from_points(&[(60.0, 85.0), (60.0, 90.0)]);

        assert!(matches!(
            store.save(&set),
            Err(CounterError::InvalidCalibration(_))
        ));

        let json = r#"{"checkpoints": [
            {"time_seconds": 60, "counter": 85},
            {"time_seconds": 60, "counter": 90}
        ]}"#;
        std::fs::write(store.path(), json).unwrap();
        assert!(matches!(
            store.load(),
            Err(CounterError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn decreasing_counter_is_rejected() {
        let set = CalibrationSet::from_points(&[(60.0, 85.0), (300.0, 80.0)]);
        assert!(matches!(
            set.validate(),
            Err(CounterError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn equal_consecutive_counters_are_valid() {
        // A stalled counter between two marks is a real observation.
        let set = CalibrationSet::from_points(&[(60.0, 100.0), (120.0, 100.0)]);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn empty_set_is_rejected() {
        let set = CalibrationSet::default();
        assert!(matches!(
            set.validate(),
            Err(CounterError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn zero_or_negative_times_are_rejected() {
        for t in [0.0, -30.0] {
            let set = CalibrationSet::from_points(&[(t, 10.0)]);
            assert!(matches!(
                set.validate(),
                Err(CounterError::InvalidCalibration(_))
            ));
        }
    }

    #[test]
    fn save_replaces_prior_content_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&CalibrationSet::from_points(&[(60.0, 85.0), (300.0, 422.0)]))
            .unwrap();
        store
            .save(&CalibrationSet::from_points(&[(90.0, 120.0)]))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.checkpoints.len(), 1);
        assert_eq!(loaded.checkpoints[0].time_seconds, 90.0);
    }
}
