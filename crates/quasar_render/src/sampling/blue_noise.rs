//! Blue-noise sampling via Mitchell's best-candidate algorithm.

use rand::Rng;
use rand::RngCore;

use super::Sample2D;

/// Candidates drawn per placed sample.
const CANDIDATE_COUNT: usize = 64;

/// Grows a sample set one point at a time, each time keeping the candidate
/// farthest from everything placed so far. Distances wrap at the unit-square
/// edges so neighboring pixels tile without seams.
#[derive(Debug, Default)]
pub struct BlueNoisePattern;

impl BlueNoisePattern {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_samples(&self, n: u32, rng: &mut dyn RngCore) -> Vec<Sample2D> {
        let n = n as usize;
        let mut samples = Vec::with_capacity(n);
        if n == 0 {
            return samples;
        }

        samples.push(Sample2D::new(rng.gen(), rng.gen()));

        while samples.len() < n {
            let mut best_candidate = Sample2D::new(0.0, 0.0);
            let mut best_distance = -1.0f32;

            for _ in 0..CANDIDATE_COUNT {
                let candidate = Sample2D::new(rng.gen(), rng.gen());
                let distance = min_distance_to_samples(&candidate, &samples);

                if distance > best_distance {
                    best_candidate = candidate;
                    best_distance = distance;
                }
            }

            samples.push(best_candidate);
        }

        samples
    }
}

/// Distance on the unit torus (coordinates wrap at 0 and 1).
fn toroidal_distance(a: &Sample2D, b: &Sample2D) -> f32 {
    let mut dx = (a.x - b.x).abs();
    let mut dy = (a.y - b.y).abs();

    dx = dx.min(1.0 - dx);
    dy = dy.min(1.0 - dy);

    (dx * dx + dy * dy).sqrt()
}

fn min_distance_to_samples(candidate: &Sample2D, samples: &[Sample2D]) -> f32 {
    samples
        .iter()
        .map(|s| toroidal_distance(candidate, s))
        .fold(f32::MAX, f32::min)
}
