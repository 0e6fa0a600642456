//! Multi-bounce reflective ray tracing.
//!
//! Bounces are tracked on an explicit LIFO stack instead of call-stack
//! recursion, so memory use is bounded by `max_depth` regardless of how
//! reflective the scene is.

use quasar_math::{Ray, Vec3};
use rand::RngCore;

use crate::material::Color;
use crate::scene::Scene;

/// Reflectance below this contributes no visible reflection.
const MIN_REFLECTANCE: f32 = 1e-4;
/// Reflection rays start this far off the surface along the normal.
const REFLECTION_BIAS: f32 = 1e-4;

/// A pending reflection bounce.
struct RayBounce {
    ray: Ray,
    /// Fraction of light surviving all reflections up to this bounce.
    attenuation: Color,
    depth: u32,
}

/// Iterative Whitted-style tracer over a scene.
pub struct RayTracer<'a> {
    scene: &'a Scene,
    max_depth: u32,
}

impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a Scene, max_depth: u32) -> Self {
        Self { scene, max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Accumulate direct lighting along a ray and its mirror bounces.
    ///
    /// Each hit splits its response: `1 - reflectance` of the Phong color is
    /// taken directly, `reflectance` is carried into the pushed reflection
    /// ray's attenuation. Energy conserving to first order only; there is no
    /// Fresnel term and no global illumination.
    pub fn trace_with_reflections(&self, initial_ray: Ray, rng: &mut dyn RngCore) -> Color {
        let mut final_color = Color::ZERO;
        let mut stack: Vec<RayBounce> = Vec::with_capacity(self.max_depth as usize + 1);

        stack.push(RayBounce {
            ray: initial_ray,
            attenuation: Color::ONE,
            depth: 0,
        });

        while let Some(current) = stack.pop() {
            if current.depth >= self.max_depth {
                continue;
            }

            let Some(hit) = self.scene.closest_intersection(&current.ray) else {
                // Escaped to the background
                final_color += self.scene.background() * current.attenuation;
                continue;
            };

            let reflectance = hit.material.reflectance();

            let direct_color = self.scene.shade_intersection(&current.ray, &hit, rng);
            final_color += direct_color * current.attenuation * (1.0 - reflectance);

            if reflectance > MIN_REFLECTANCE && current.depth < self.max_depth - 1 {
                stack.push(RayBounce {
                    ray: reflect_ray(&current.ray, hit.point, hit.normal),
                    attenuation: current.attenuation * reflectance,
                    depth: current.depth + 1,
                });
            }
        }

        final_color
    }
}

/// Mirror-reflect a ray about a surface normal.
///
/// The normal is flipped toward the incident ray if needed, and the
/// reflected origin is offset along it so the ray cannot immediately re-hit
/// the surface it left.
pub fn reflect_ray(incident: &Ray, hit_point: Vec3, normal: Vec3) -> Ray {
    let n = if incident.direction.dot(normal) > 0.0 {
        -normal
    } else {
        normal
    };

    let reflected = incident.direction - n * (2.0 * incident.direction.dot(n));
    Ray::new(hit_point + n * REFLECTION_BIAS, reflected)
}
