//! Material trait for surface shading.

use quasar_math::Vec3;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Surface properties consumed by the Phong shading stage and the mirror
/// tracer. Implementations may vary per point through the UV parameters.
pub trait Material: Send + Sync {
    /// Diffuse color at the given texture coordinates.
    fn diffuse_color(&self, u: f32, v: f32) -> Color;

    /// Ambient response.
    fn ambient_color(&self) -> Color;

    /// Specular response.
    fn specular_color(&self) -> Color;

    /// Phong specular exponent.
    fn shininess(&self) -> f32;

    /// How mirror-like the surface is, in [0, 1]. Zero means purely
    /// diffuse; one means all response goes into the reflection ray.
    fn reflectance(&self) -> f32;
}

/// Uniform color across the entire surface.
#[derive(Debug, Clone)]
pub struct SolidMaterial {
    diffuse: Color,
    ambient: Color,
    specular: Color,
    shininess: f32,
    reflectance: f32,
}

impl SolidMaterial {
    pub fn new(
        diffuse: Color,
        ambient: Color,
        specular: Color,
        shininess: f32,
        reflectance: f32,
    ) -> Self {
        Self {
            diffuse,
            ambient,
            specular,
            shininess,
            reflectance: reflectance.clamp(0.0, 1.0),
        }
    }

    /// Diffuse color and reflectance with the standard ambient/specular
    /// defaults.
    pub fn with_reflectance(diffuse: Color, reflectance: f32) -> Self {
        Self::new(
            diffuse,
            Color::splat(0.1),
            Color::splat(0.3),
            32.0,
            reflectance,
        )
    }
}

impl Material for SolidMaterial {
    fn diffuse_color(&self, _u: f32, _v: f32) -> Color {
        self.diffuse
    }

    fn ambient_color(&self) -> Color {
        self.ambient
    }

    fn specular_color(&self) -> Color {
        self.specular
    }

    fn shininess(&self) -> f32 {
        self.shininess
    }

    fn reflectance(&self) -> f32 {
        self.reflectance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_material_defaults() {
        let mat = SolidMaterial::with_reflectance(Color::new(1.0, 0.0, 0.0), 0.5);

        assert_eq!(mat.diffuse_color(0.0, 0.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(mat.ambient_color(), Color::splat(0.1));
        assert_eq!(mat.specular_color(), Color::splat(0.3));
        assert_eq!(mat.shininess(), 32.0);
        assert_eq!(mat.reflectance(), 0.5);
    }

    #[test]
    fn test_reflectance_clamped() {
        let mat = SolidMaterial::with_reflectance(Color::ONE, 2.0);
        assert_eq!(mat.reflectance(), 1.0);

        let mat = SolidMaterial::with_reflectance(Color::ONE, -1.0);
        assert_eq!(mat.reflectance(), 0.0);
    }
}
