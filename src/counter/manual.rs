use crate::counter::{CalibrationSet, CounterError};

/// Piecewise-linear counter curve through measured checkpoints.
///
/// The counter read zero when the tape was zeroed at load, so the segment
/// from the origin to the first checkpoint is implied rather than measured.
/// Past the last checkpoint the final observed rate is held.
pub struct ManualModel {
    /// Sorted (time, counter) pairs, non-empty by construction.
    points: Vec<(f64, f64)>,
}

impl ManualModel {
    pub fn new(mut calibration: CalibrationSet) -> Result<Self, CounterError> {
        calibration.sort();
        calibration.validate()?;
        let points = calibration
            .checkpoints
            .iter()
            .map(|cp| (cp.time_seconds, cp.counter))
            .collect();
        Ok(Self { points })
    }

    pub fn counter_at(&self, elapsed: f64) -> Result<f64, CounterError> {
        if elapsed < 0.0 {
            return Err(CounterError::InvalidInput(elapsed));
        }
        let (t0, c0) = self.points[0];
        if elapsed < t0 {
            return Ok(c0 / t0 * elapsed);
        }
        for pair in self.points.windows(2) {
            let (ta, ca) = pair[0];
            let (tb, cb) = pair[1];
            if elapsed <= tb {
                let f = (elapsed - ta) / (tb - ta);
                return Ok(ca + f * (cb - ca));
            }
        }
        let (tn, cn) = self.points[self.points.len() - 1];
        let slope = if self.points.len() == 1 {
            c0 / t0
        } else {
            let (tp, cp) = self.points[self.points.len() - 2];
            (cn - cp) / (tn - tp)
        };
        Ok(cn + slope * (elapsed - tn))
    }
}
