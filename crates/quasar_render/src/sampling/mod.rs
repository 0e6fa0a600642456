//! Sub-pixel sampling: where to place samples inside a pixel, and how to
//! fold the traced colors back into one value.
//!
//! Patterns and integrators are closed enum sets dispatched statically; both
//! are stateless between calls, with all randomness supplied by the caller
//! so workers can keep thread-local generators.

mod blue_noise;
mod integrator;
mod poisson_disk;
mod stratified;

pub use blue_noise::BlueNoisePattern;
pub use integrator::{luminance, AdaptiveIntegrator, SampleIntegrator};
pub use poisson_disk::{poisson_disk_points, PoissonDiskPattern};
pub use stratified::StratifiedPattern;

use rand::RngCore;
use thiserror::Error;

/// A 2D offset within the unit pixel square.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample2D {
    pub x: f32,
    pub y: f32,
}

impl Sample2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("unknown sampling pattern: {0}")]
    UnknownPattern(String),

    #[error("unknown sample integrator: {0}")]
    UnknownIntegrator(String),
}

/// The set of supported sub-pixel sample distributions.
pub enum SamplePattern {
    Stratified(StratifiedPattern),
    BlueNoise(BlueNoisePattern),
    PoissonDisk(PoissonDiskPattern),
}

impl SamplePattern {
    /// Resolve a pattern by its scene-file name.
    pub fn from_name(name: &str) -> Result<Self, SamplingError> {
        match name {
            "stratified" => Ok(Self::Stratified(StratifiedPattern::new())),
            "blue_noise" => Ok(Self::BlueNoise(BlueNoisePattern::new())),
            "poisson_disk" => Ok(Self::PoissonDisk(PoissonDiskPattern::new())),
            other => Err(SamplingError::UnknownPattern(other.to_string())),
        }
    }

    /// Generate `n` samples in the unit square. Zero samples requested
    /// yields an empty vector.
    pub fn generate_samples(&self, n: u32, rng: &mut dyn RngCore) -> Vec<Sample2D> {
        match self {
            Self::Stratified(pattern) => pattern.generate_samples(n, rng),
            Self::BlueNoise(pattern) => pattern.generate_samples(n, rng),
            Self::PoissonDisk(pattern) => pattern.generate_samples(n, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stratified(_) => "stratified",
            Self::BlueNoise(_) => "blue_noise",
            Self::PoissonDisk(_) => "poisson_disk",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_name() {
        assert!(matches!(
            SamplePattern::from_name("stratified"),
            Ok(SamplePattern::Stratified(_))
        ));
        assert!(matches!(
            SamplePattern::from_name("blue_noise"),
            Ok(SamplePattern::BlueNoise(_))
        ));
        assert!(matches!(
            SamplePattern::from_name("poisson_disk"),
            Ok(SamplePattern::PoissonDisk(_))
        ));
        assert!(SamplePattern::from_name("halton").is_err());
    }

    #[test]
    fn test_all_patterns_basic_contract() {
        let mut rng = StdRng::seed_from_u64(11);

        for name in ["stratified", "blue_noise", "poisson_disk"] {
            let pattern = SamplePattern::from_name(name).unwrap();

            // Zero samples yields an empty sequence
            assert!(pattern.generate_samples(0, &mut rng).is_empty());

            // Requested count is honored, all samples in the unit square
            let samples = pattern.generate_samples(16, &mut rng);
            assert_eq!(samples.len(), 16, "{name}");
            for s in &samples {
                assert!((0.0..=1.0).contains(&s.x), "{name}: {s:?}");
                assert!((0.0..=1.0).contains(&s.y), "{name}: {s:?}");
            }
        }
    }
}
