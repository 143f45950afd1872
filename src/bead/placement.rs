use std::f64::consts::TAU;

use rand::Rng;

use crate::math::Point2;

/// Samples non-overlapping key centers on a disk by rejection.
///
/// Each attempt draws a point uniformly by area (`r = U·√u`, angle uniform
/// in `[0, 2π)`) and accepts it if it is strictly farther than
/// `min_separation` from every accepted point. Sampling stops after `count`
/// acceptances or `max_attempts` draws, whichever comes first, so the result
/// may be short. The only randomness consumed is two draws per attempt.
pub struct PlaceKeys {
    count: usize,
    usable_radius: f64,
    min_separation: f64,
    max_attempts: usize,
}

impl PlaceKeys {
    /// Creates a new `PlaceKeys` operation.
    #[must_use]
    pub fn new(count: usize, usable_radius: f64, min_separation: f64, max_attempts: usize) -> Self {
        Self {
            count,
            usable_radius,
            min_separation,
            max_attempts,
        }
    }

    /// Executes the sampling with the given RNG stream.
    pub fn execute<R: Rng>(&self, rng: &mut R) -> Vec<Point2> {
        let mut accepted: Vec<Point2> = Vec::with_capacity(self.count);
        let mut attempts = 0;
        while accepted.len() < self.count && attempts < self.max_attempts {
            attempts += 1;
            let r = self.usable_radius * rng.random::<f64>().sqrt();
            let angle = rng.random_range(0.0..TAU);
            let candidate = Point2::new(r * angle.cos(), r * angle.sin());
            if accepted
                .iter()
                .all(|p| (p - candidate).norm() > self.min_separation)
            {
                accepted.push(candidate);
            }
        }
        if accepted.len() < self.count {
            tracing::debug!(
                placed = accepted.len(),
                requested = self.count,
                attempts,
                "placement budget exhausted"
            );
        }
        accepted
    }
}
