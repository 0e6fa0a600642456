//! Phong lighting: ambient + shadow-gated diffuse and specular terms.

use quasar_math::Vec3;
use rand::RngCore;

use crate::light::Light;
use crate::material::{Color, Material};
use std::sync::Arc;

/// Evaluate the Phong model at a surface point.
///
/// Every light contributes through its shadow samples: point lights have a
/// single sample, area lights spread theirs across the emitter so partially
/// occluded sample sets produce soft shadow edges. `shadow_test(point,
/// direction, distance)` must report whether the path to a light sample is
/// blocked. The result is clamped to [0, 1] per channel; anything beyond
/// that is the tone mapper's problem, not ours.
pub fn calculate_lighting<F>(
    surface_point: Vec3,
    surface_normal: Vec3,
    view_direction: Vec3,
    material: &dyn Material,
    lights: &[Arc<dyn Light>],
    rng: &mut dyn RngCore,
    shadow_test: F,
) -> Color
where
    F: Fn(Vec3, Vec3, f32) -> bool,
{
    let mut final_color = material.ambient_color();

    for light in lights {
        for sample in light.samples(surface_point, rng) {
            if sample.weight <= 0.0 {
                continue;
            }
            if shadow_test(surface_point, sample.direction, sample.distance) {
                continue;
            }

            let diffuse = calculate_diffuse(
                sample.direction,
                surface_normal,
                sample.intensity,
                material,
            );
            let specular = calculate_specular(
                sample.direction,
                surface_normal,
                view_direction,
                sample.intensity,
                material,
            );

            final_color += (diffuse + specular) * sample.weight;
        }
    }

    final_color.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Lambert's law: intensity scales with dot(normal, light direction).
fn calculate_diffuse(
    light_direction: Vec3,
    surface_normal: Vec3,
    light_intensity: Color,
    material: &dyn Material,
) -> Color {
    let diffuse_factor = surface_normal.dot(light_direction).max(0.0);
    material.diffuse_color(0.0, 0.0) * light_intensity * diffuse_factor
}

/// Phong specular: (R.V)^shininess with R = 2(N.L)N - L.
fn calculate_specular(
    light_direction: Vec3,
    surface_normal: Vec3,
    view_direction: Vec3,
    light_intensity: Color,
    material: &dyn Material,
) -> Color {
    let nl_dot = surface_normal.dot(light_direction);
    let reflection = surface_normal * (2.0 * nl_dot) - light_direction;

    let rv_dot = reflection.dot(view_direction).max(0.0);
    let specular_factor = rv_dot.powf(material.shininess());

    material.specular_color() * light_intensity * specular_factor
}
