//! Sample integrators: averaging and variance-adaptive refinement.

use rand::RngCore;

use super::{Sample2D, SamplePattern, SamplingError};
use crate::material::Color;

/// BT.601 perceptual luminance. Used consistently wherever a scalar
/// brightness is needed.
pub fn luminance(color: Color) -> f32 {
    0.299 * color.x + 0.587 * color.y + 0.114 * color.z
}

/// Combines per-sample colors into one pixel color.
pub enum SampleIntegrator {
    /// Plain arithmetic mean.
    Average,
    /// Mean over an adaptively grown sample set.
    Adaptive(AdaptiveIntegrator),
}

impl SampleIntegrator {
    /// Resolve an integrator by its scene-file name.
    pub fn from_name(
        name: &str,
        base_samples: u32,
        max_samples: u32,
        variance_threshold: f32,
        adaptation_levels: u32,
    ) -> Result<Self, SamplingError> {
        match name {
            "average" => Ok(Self::Average),
            "adaptive" => Ok(Self::Adaptive(AdaptiveIntegrator::new(
                base_samples,
                max_samples,
                variance_threshold,
                adaptation_levels,
            ))),
            other => Err(SamplingError::UnknownIntegrator(other.to_string())),
        }
    }

    /// Combine already-traced colors. Empty input integrates to black.
    pub fn integrate(&self, _samples: &[Sample2D], colors: &[Color]) -> Color {
        mean_color(colors)
    }
}

/// Grows the sample count while the luminance variance of the collected
/// colors stays above a threshold.
///
/// The count starts at `base_samples` and doubles per refinement round,
/// capped at `max_samples`; the number of rounds is capped at
/// `adaptation_levels`, so the loop always terminates with a total in
/// `[base_samples, max_samples]`.
pub struct AdaptiveIntegrator {
    base_samples: u32,
    max_samples: u32,
    variance_threshold: f32,
    adaptation_levels: u32,
}

impl AdaptiveIntegrator {
    pub fn new(
        base_samples: u32,
        max_samples: u32,
        variance_threshold: f32,
        adaptation_levels: u32,
    ) -> Self {
        Self {
            base_samples: base_samples.max(1),
            max_samples: max_samples.max(base_samples.max(1)),
            variance_threshold,
            adaptation_levels,
        }
    }

    pub fn base_samples(&self) -> u32 {
        self.base_samples
    }

    pub fn max_samples(&self) -> u32 {
        self.max_samples
    }

    /// Trace one pixel adaptively.
    ///
    /// `trace` maps a sub-pixel sample to its radiance; the integrator
    /// decides how many samples to spend. The generator is threaded through
    /// to the closure so one per-worker RNG serves both sampling and
    /// tracing.
    pub fn integrate_adaptive<F>(
        &self,
        pattern: &SamplePattern,
        rng: &mut dyn RngCore,
        mut trace: F,
    ) -> Color
    where
        F: FnMut(Sample2D, &mut dyn RngCore) -> Color,
    {
        let mut colors: Vec<Color> = Vec::with_capacity(self.max_samples as usize);
        let mut current_samples = self.base_samples;

        for sample in pattern.generate_samples(current_samples, rng) {
            colors.push(trace(sample, rng));
        }

        for _level in 0..self.adaptation_levels {
            if !self.needs_more_samples(&colors, current_samples) {
                break;
            }

            current_samples = (current_samples * 2).min(self.max_samples);
            let additional = current_samples as usize - colors.len();
            if additional == 0 {
                break;
            }

            for sample in pattern.generate_samples(additional as u32, rng) {
                colors.push(trace(sample, rng));
            }
        }

        mean_color(&colors)
    }

    fn needs_more_samples(&self, colors: &[Color], current_samples: u32) -> bool {
        if current_samples >= self.max_samples {
            return false;
        }
        color_variance(colors) > self.variance_threshold
    }
}

fn mean_color(colors: &[Color]) -> Color {
    if colors.is_empty() {
        return Color::ZERO;
    }
    colors.iter().copied().sum::<Color>() / colors.len() as f32
}

/// Sample variance of the colors' luminance (n-1 divisor).
fn color_variance(colors: &[Color]) -> f32 {
    if colors.len() < 2 {
        return 0.0;
    }

    let mean_luminance = luminance(mean_color(colors));

    let variance_sum: f32 = colors
        .iter()
        .map(|c| {
            let diff = luminance(*c) - mean_luminance;
            diff * diff
        })
        .sum();

    variance_sum / (colors.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn adaptive(base: u32, max: u32, threshold: f32, levels: u32) -> AdaptiveIntegrator {
        AdaptiveIntegrator::new(base, max, threshold, levels)
    }

    #[test]
    fn test_average_empty_is_black() {
        let integrator = SampleIntegrator::Average;
        assert_eq!(integrator.integrate(&[], &[]), Color::ZERO);
    }

    #[test]
    fn test_average_mean() {
        let integrator = SampleIntegrator::Average;
        let colors = [Color::ZERO, Color::ONE];
        assert_eq!(integrator.integrate(&[], &colors), Color::splat(0.5));
    }

    #[test]
    fn test_from_name() {
        assert!(matches!(
            SampleIntegrator::from_name("average", 4, 64, 0.01, 3),
            Ok(SampleIntegrator::Average)
        ));
        assert!(matches!(
            SampleIntegrator::from_name("adaptive", 4, 64, 0.01, 3),
            Ok(SampleIntegrator::Adaptive(_))
        ));
        assert!(SampleIntegrator::from_name("median", 4, 64, 0.01, 3).is_err());
    }

    #[test]
    fn test_constant_color_converges_at_base() {
        let integrator = adaptive(4, 64, 0.0001, 3);
        let pattern = SamplePattern::from_name("stratified").unwrap();
        let mut rng = StdRng::seed_from_u64(20);

        let constant = Color::new(0.25, 0.5, 0.75);
        let mut calls = 0u32;
        let result = integrator.integrate_adaptive(&pattern, &mut rng, |_, _| {
            calls += 1;
            constant
        });

        // Zero variance: no refinement rounds, exact convergence
        assert_eq!(calls, 4);
        assert!((result - constant).length() < 1e-6);
    }

    #[test]
    fn test_alternating_extremes_trigger_refinement() {
        let integrator = adaptive(4, 64, 0.001, 3);
        let pattern = SamplePattern::from_name("stratified").unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        let mut calls = 0u32;
        let _ = integrator.integrate_adaptive(&pattern, &mut rng, |_, _| {
            calls += 1;
            if calls % 2 == 0 {
                Color::ONE
            } else {
                Color::ZERO
            }
        });

        // High variance: strictly more than base, never beyond max
        assert!(calls > 4);
        assert!(calls <= 64);
    }

    #[test]
    fn test_sample_count_bounds() {
        let pattern = SamplePattern::from_name("stratified").unwrap();

        for (base, max, levels) in [(1u32, 8u32, 10u32), (4, 4, 3), (8, 64, 1), (2, 5, 8)] {
            let integrator = adaptive(base, max, 0.0, levels);
            let mut rng = StdRng::seed_from_u64(22);

            let mut calls = 0u32;
            // Worst case: noise keeps variance high forever
            let _ = integrator.integrate_adaptive(&pattern, &mut rng, |s, _| {
                calls += 1;
                Color::splat(if (s.x * 1000.0) as u32 % 2 == 0 { 1.0 } else { 0.0 })
            });

            assert!(calls >= base, "base {base} max {max}: {calls}");
            assert!(calls <= max, "base {base} max {max}: {calls}");
        }
    }

    #[test]
    fn test_luminance_weights() {
        assert!((luminance(Color::ONE) - 1.0).abs() < 1e-5);
        assert!((luminance(Color::new(1.0, 0.0, 0.0)) - 0.299).abs() < 1e-6);
        assert!((luminance(Color::new(0.0, 1.0, 0.0)) - 0.587).abs() < 1e-6);
        assert!((luminance(Color::new(0.0, 0.0, 1.0)) - 0.114).abs() < 1e-6);
    }
}
