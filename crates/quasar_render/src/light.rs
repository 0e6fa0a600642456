//! Light sources.
//!
//! Point lights answer every query with a single sample; rectangular area
//! lights spread their samples across the emitting surface so shadow rays
//! toward different samples produce penumbrae.

use quasar_core::AreaSamplingMethod;
use quasar_math::Vec3;
use rand::Rng;
use rand::RngCore;

use crate::material::Color;

/// One shadow-tested contribution from a light.
#[derive(Debug, Copy, Clone)]
pub struct LightSample {
    /// Sample position on the light surface (unused for point lights).
    pub position: Vec3,
    /// Unit direction from the surface point to the light sample.
    pub direction: Vec3,
    /// Incident intensity at the surface point from this sample.
    pub intensity: Color,
    /// Distance to the light sample, for shadow ray clipping.
    pub distance: f32,
    /// Contribution weight; weights of all samples of one light sum to ~1.
    pub weight: f32,
}

/// A light source as seen by the shading stage.
pub trait Light: Send + Sync {
    /// Unit direction from a surface point toward the light.
    fn direction_to(&self, surface_point: Vec3) -> Vec3;

    /// Incident intensity at a surface point.
    fn intensity_at(&self, surface_point: Vec3) -> Color;

    /// Distance from a surface point to the light, for shadow testing.
    fn distance(&self, surface_point: Vec3) -> f32;

    /// Shadow samples for this light. Point-like lights return one sample
    /// of weight 1.
    fn samples(&self, surface_point: Vec3, _rng: &mut dyn RngCore) -> Vec<LightSample> {
        vec![LightSample {
            position: Vec3::ZERO,
            direction: self.direction_to(surface_point),
            intensity: self.intensity_at(surface_point),
            distance: self.distance(surface_point),
            weight: 1.0,
        }]
    }
}

/// Point light with configurable distance attenuation.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    intensity: Color,
    attenuation_constant: f32,
    attenuation_linear: f32,
    attenuation_quadratic: f32,
}

impl PointLight {
    /// Unattenuated point light.
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self::with_attenuation(position, intensity, 1.0, 0.0, 0.0)
    }

    pub fn with_attenuation(
        position: Vec3,
        intensity: Color,
        constant: f32,
        linear: f32,
        quadratic: f32,
    ) -> Self {
        Self {
            position,
            intensity,
            attenuation_constant: constant,
            attenuation_linear: linear,
            attenuation_quadratic: quadratic,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl Light for PointLight {
    fn direction_to(&self, surface_point: Vec3) -> Vec3 {
        (self.position - surface_point).normalize_or_zero()
    }

    fn intensity_at(&self, surface_point: Vec3) -> Color {
        let distance = self.distance(surface_point);
        let attenuation = self.attenuation_constant
            + self.attenuation_linear * distance
            + self.attenuation_quadratic * distance * distance;

        self.intensity / attenuation
    }

    fn distance(&self, surface_point: Vec3) -> f32 {
        (self.position - surface_point).length()
    }
}

/// Rectangular area light spanning `width x height` around its center.
pub struct RectangularAreaLight {
    center: Vec3,
    /// Half-extent edge vectors; `center ± u_axis ± v_axis` are corners.
    u_axis: Vec3,
    v_axis: Vec3,
    normal: Vec3,
    intensity: Color,
    sample_count: u32,
    sampling_method: AreaSamplingMethod,
}

impl RectangularAreaLight {
    pub fn new(
        center: Vec3,
        u_direction: Vec3,
        v_direction: Vec3,
        width: f32,
        height: f32,
        intensity: Color,
        sample_count: u32,
        sampling_method: AreaSamplingMethod,
    ) -> Self {
        let u_axis = u_direction.normalize_or_zero() * (width * 0.5);
        let v_axis = v_direction.normalize_or_zero() * (height * 0.5);
        Self {
            center,
            u_axis,
            v_axis,
            normal: u_axis.cross(v_axis).normalize_or_zero(),
            intensity,
            sample_count,
            sampling_method,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    fn sample_from_uv(&self, surface_point: Vec3, u: f32, v: f32, total: usize) -> LightSample {
        // Map [0,1] to [-1,1] so the samples cover the whole rectangle
        let u = u * 2.0 - 1.0;
        let v = v * 2.0 - 1.0;

        let position = self.center + self.u_axis * u + self.v_axis * v;

        let to_sample = position - surface_point;
        let distance = to_sample.length();
        let direction = to_sample.normalize_or_zero();

        let intensity = self.intensity / (distance * distance + 1.0);

        // Lambert falloff against the emitter orientation
        let cos_theta = self.normal.dot(-direction).max(0.0);
        let weight = cos_theta / total as f32;

        LightSample {
            position,
            direction,
            intensity,
            distance,
            weight,
        }
    }

    fn stratified_uv(&self, rng: &mut dyn RngCore) -> Vec<(f32, f32)> {
        let grid = (self.sample_count as f32).sqrt().floor().max(1.0) as u32;
        let cell = 1.0 / grid as f32;

        let mut points = Vec::with_capacity((grid * grid) as usize);
        for i in 0..grid {
            for j in 0..grid {
                let u = (i as f32 + rng.gen::<f32>()) * cell;
                let v = (j as f32 + rng.gen::<f32>()) * cell;
                points.push((u, v));
            }
        }
        points
    }

    fn poisson_uv(&self, rng: &mut dyn RngCore) -> Vec<(f32, f32)> {
        let target = self.sample_count as usize;
        let min_dist = (1.0 / target.max(1) as f32).sqrt() * 0.7;

        crate::sampling::poisson_disk_points(target, min_dist, rng)
            .into_iter()
            .map(|s| (s.x, s.y))
            .collect()
    }
}

impl Light for RectangularAreaLight {
    fn direction_to(&self, surface_point: Vec3) -> Vec3 {
        (self.center - surface_point).normalize_or_zero()
    }

    fn intensity_at(&self, surface_point: Vec3) -> Color {
        let distance = self.distance(surface_point);
        self.intensity / (distance * distance + 1.0)
    }

    fn distance(&self, surface_point: Vec3) -> f32 {
        (self.center - surface_point).length()
    }

    fn samples(&self, surface_point: Vec3, rng: &mut dyn RngCore) -> Vec<LightSample> {
        let uv_points = match self.sampling_method {
            AreaSamplingMethod::Stratified => self.stratified_uv(rng),
            AreaSamplingMethod::PoissonDisk => self.poisson_uv(rng),
        };

        let total = uv_points.len();
        uv_points
            .into_iter()
            .map(|(u, v)| self.sample_from_uv(surface_point, u, v, total))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_point_light_direction_and_distance() {
        let light = PointLight::new(Vec3::new(0.0, 10.0, 0.0), Color::ONE);

        let dir = light.direction_to(Vec3::ZERO);
        assert!((dir - Vec3::Y).length() < 1e-6);
        assert!((light.distance(Vec3::ZERO) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_light_single_sample() {
        let light = PointLight::new(Vec3::new(0.0, 10.0, 0.0), Color::ONE);
        let mut rng = StdRng::seed_from_u64(1);

        let samples = light.samples(Vec3::ZERO, &mut rng);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].weight, 1.0);
    }

    #[test]
    fn test_point_light_quadratic_falloff() {
        let light =
            PointLight::with_attenuation(Vec3::new(0.0, 2.0, 0.0), Color::ONE, 0.0, 0.0, 1.0);

        let intensity = light.intensity_at(Vec3::ZERO);
        assert!((intensity.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_area_light_sample_positions_on_rectangle() {
        let light = RectangularAreaLight::new(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::X,
            Vec3::Z,
            2.0,
            2.0,
            Color::ONE,
            16,
            AreaSamplingMethod::Stratified,
        );
        let mut rng = StdRng::seed_from_u64(2);

        let samples = light.samples(Vec3::ZERO, &mut rng);
        assert_eq!(samples.len(), 16);

        for sample in &samples {
            assert!((sample.position.y - 5.0).abs() < 1e-5);
            assert!(sample.position.x.abs() <= 1.0 + 1e-5);
            assert!(sample.position.z.abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_area_light_weights_cosine_bounded() {
        let light = RectangularAreaLight::new(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::X,
            Vec3::Z,
            2.0,
            2.0,
            Color::ONE,
            9,
            AreaSamplingMethod::PoissonDisk,
        );
        let mut rng = StdRng::seed_from_u64(3);

        let samples = light.samples(Vec3::ZERO, &mut rng);
        assert!(!samples.is_empty());

        let total_weight: f32 = samples.iter().map(|s| s.weight).sum();
        assert!(total_weight <= 1.0 + 1e-4);
    }
}
