//! Look-at camera with optional thin-lens depth of field.

use quasar_core::CameraSettings;
use quasar_math::{Ray, Vec3};
use rand::Rng;
use rand::RngCore;

/// Generates primary rays for normalized screen coordinates.
///
/// `u` runs left to right and `v` bottom to top, both in [0, 1]. With a zero
/// aperture the camera is a pinhole and `get_ray` is deterministic; a
/// positive aperture samples the lens disk and focuses on the plane at
/// `focus_distance`.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Pinhole camera. `vfov` is the vertical field of view in degrees.
    pub fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov: f32, aspect_ratio: f32) -> Self {
        Self::with_lens(look_from, look_at, vup, vfov, aspect_ratio, 0.0, 1.0)
    }

    /// Thin-lens camera. `aperture` is the lens diameter; zero degrades to
    /// a pinhole.
    pub fn with_lens(
        look_from: Vec3,
        look_at: Vec3,
        vup: Vec3,
        vfov: f32,
        aspect_ratio: f32,
        aperture: f32,
        focus_distance: f32,
    ) -> Self {
        let theta = vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = aspect_ratio * half_height;

        let w = (look_from - look_at).normalize_or_zero();
        let u = vup.cross(w).normalize_or_zero();
        let v = w.cross(u);

        let origin = look_from;
        let horizontal = u * (2.0 * half_width * focus_distance);
        let vertical = v * (2.0 * half_height * focus_distance);
        let lower_left_corner = origin
            - u * (half_width * focus_distance)
            - v * (half_height * focus_distance)
            - w * focus_distance;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: aperture / 2.0,
        }
    }

    /// Build from parsed settings and the output resolution.
    pub fn from_settings(settings: &CameraSettings, width: u32, height: u32) -> Self {
        Self::with_lens(
            settings.position,
            settings.look_at,
            settings.up,
            settings.fov,
            width as f32 / height.max(1) as f32,
            settings.aperture,
            settings.focus_distance,
        )
    }

    pub fn position(&self) -> Vec3 {
        self.origin
    }

    /// Primary ray through screen position (u, v) in [0,1] x [0,1].
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let target = self.lower_left_corner + self.horizontal * s + self.vertical * t;

        if self.lens_radius <= 0.0 {
            return Ray::new(self.origin, target - self.origin);
        }

        let rd = random_in_unit_disk(rng) * self.lens_radius;
        let offset = self.u * rd.x + self.v * rd.y;

        Ray::new(self.origin + offset, target - self.origin - offset)
    }
}

/// Rejection-sample a point in the unit disk (z = 0).
fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
