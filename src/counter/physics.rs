use std::f64::consts::PI;

use crate::counter::CounterError;

/// Reel geometry and pacing for the physics counter.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsParams {
    /// Tape speed past the head in mm/s.
    pub linear_speed: f64,
    /// Radius of the bare takeup hub in mm.
    pub hub_radius: f64,
    /// Thickness of the tape stock in mm.
    pub tape_thickness: f64,
    /// Counts per second the counter should show at mid-tape.
    pub reference_rate: f64,
    /// Nominal length of the side in seconds, used only to place mid-tape.
    pub total_duration: f64,
}

/// Counter curve derived from reel geometry.
///
/// Tape winds onto the takeup reel at constant linear speed, so the pack
/// area grows linearly and the pack radius grows as a square root:
///
///   radius(t) = sqrt(hub^2 + a * t),  a = thickness * speed / pi
///
/// A mechanical counter is geared to reel revolutions, so its rate is
/// proportional to speed / radius(t). Integrating gives the closed form
/// below. The gear factor k is chosen so the rate at mid-tape equals the
/// configured reference rate, which keeps readings comparable with the
/// static model at the same setting.
pub struct PhysicsModel {
    params: PhysicsParams,
    /// Pack growth per second, mm^2/s.
    a: f64,
    /// Gear factor fixed by the mid-tape anchor.
    k: f64,
}

impl PhysicsModel {
    pub fn new(params: PhysicsParams) -> Self {
        let a = params.tape_thickness * params.linear_speed / PI;
        let k = if a > 0.0 {
            let radius_mid = Self::radius_for(&params, a, params.total_duration / 2.0);
            params.reference_rate * radius_mid / params.linear_speed
        } else {
            0.0
        };
        Self { params, a, k }
    }

    fn radius_for(params: &PhysicsParams, a: f64, elapsed: f64) -> f64 {
        (params.hub_radius * params.hub_radius + a * elapsed).sqrt()
    }

    /// Pack radius after `elapsed` seconds of winding.
    pub fn radius_at(&self, elapsed: f64) -> f64 {
        Self::radius_for(&self.params, self.a, elapsed)
    }

    pub fn counter_at(&self, elapsed: f64) -> Result<f64, CounterError> {
        if elapsed < 0.0 {
            return Err(CounterError::InvalidInput(elapsed));
        }
        if self.a <= 0.0 {
            // Degenerate geometry winds nothing; pace like the static model.
            return Ok(self.params.reference_rate * elapsed);
        }
        // Algebraically k * speed * (2/a) * (radius - hub), written so that
        // no near-equal radii are subtracted when a*t is tiny next to hub^2.
        let radius = self.radius_at(elapsed);
        Ok(2.0 * self.k * self.params.linear_speed * elapsed / (radius + self.params.hub_radius))
    }
}
