//! Sphere primitive and its closed-form intersection test.

use quasar_math::{Ray, Vec3};

/// A sphere defined by center and radius.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Both roots of the ray/sphere quadratic, ordered `t_near <= t_far`.
///
/// A tangent ray reports `t_near == t_far`; a ray starting inside the sphere
/// reports a negative `t_near` and a positive `t_far`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereHit {
    pub t_near: f32,
    pub t_far: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Outward unit normal at a surface point.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }

    /// Solve the ray/sphere quadratic.
    ///
    /// Returns `None` when the discriminant is negative or both roots lie
    /// behind the ray origin.
    pub fn intersect(&self, ray: &Ray) -> Option<SphereHit> {
        let oc = ray.origin - self.center;

        let a = ray.direction.length_squared();
        let b = 2.0 * oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let mut t_near = (-b - sqrt_discriminant) / (2.0 * a);
        let mut t_far = (-b + sqrt_discriminant) / (2.0 * a);
        if t_near > t_far {
            std::mem::swap(&mut t_near, &mut t_far);
        }

        // Both intersections behind the ray origin
        if t_far < 0.0 {
            return None;
        }

        Some(SphereHit { t_near, t_far })
    }
}
