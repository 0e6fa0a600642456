//! Stratified (jittered grid) sampling.

use rand::Rng;
use rand::RngCore;

use super::Sample2D;

/// Divides the pixel into a near-square grid and jitters one sample per
/// cell, which keeps samples well spread at any count.
#[derive(Debug, Default)]
pub struct StratifiedPattern;

impl StratifiedPattern {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_samples(&self, n: u32, rng: &mut dyn RngCore) -> Vec<Sample2D> {
        if n == 0 {
            return Vec::new();
        }

        let grid_size = (n as f32).sqrt().ceil() as u32;
        let cell_size = 1.0 / grid_size as f32;

        let mut samples = Vec::with_capacity(n as usize);
        for i in 0..n {
            let row = i / grid_size;
            let col = i % grid_size;

            let base_x = col as f32 * cell_size;
            let base_y = row as f32 * cell_size;

            samples.push(Sample2D::new(
                base_x + rng.gen::<f32>() * cell_size,
                base_y + rng.gen::<f32>() * cell_size,
            ));
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_in_their_cells() {
        let pattern = StratifiedPattern::new();
        let mut rng = StdRng::seed_from_u64(5);

        let n = 16u32;
        let grid_size = 4u32;
        let cell = 1.0 / grid_size as f32;

        let samples = pattern.generate_samples(n, &mut rng);
        assert_eq!(samples.len(), 16);

        for (i, s) in samples.iter().enumerate() {
            let row = i as u32 / grid_size;
            let col = i as u32 % grid_size;
            assert!(s.x >= col as f32 * cell && s.x <= (col + 1) as f32 * cell);
            assert!(s.y >= row as f32 * cell && s.y <= (row + 1) as f32 * cell);
        }
    }

    #[test]
    fn test_non_square_count() {
        let pattern = StratifiedPattern::new();
        let mut rng = StdRng::seed_from_u64(6);

        // 5 samples on a 3x3 grid: count is still honored exactly
        let samples = pattern.generate_samples(5, &mut rng);
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn test_zero_samples() {
        let pattern = StratifiedPattern::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(pattern.generate_samples(0, &mut rng).is_empty());
    }
}
