//! Scene description types.
//!
//! These structs mirror the shape of a scene file one-to-one and carry no
//! renderer state. Colors are linear RGB in `Vec3` form; all defaults match
//! what an absent field means in a scene file.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera parameters. `aperture == 0` selects a pinhole camera; anything
/// larger enables the thin-lens model focused at `focus_distance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub position: Vec3,
    pub look_at: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    #[serde(default)]
    pub aperture: f32,
    #[serde(default = "default_focus_distance")]
    pub focus_distance: f32,
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_focus_distance() -> f32 {
    1.0
}

/// Multisampling configuration: which pattern generates sub-pixel offsets,
/// which integrator combines the traced colors, and the adaptive bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultisamplingSettings {
    #[serde(default = "default_samples_per_pixel")]
    pub samples_per_pixel: u32,
    #[serde(default = "default_pattern")]
    pub sampling_pattern: String,
    #[serde(default = "default_integrator")]
    pub sample_integrator: String,
    #[serde(default = "default_max_samples")]
    pub max_samples_per_pixel: u32,
    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f32,
    #[serde(default = "default_adaptation_levels")]
    pub adaptation_levels: u32,
}

fn default_samples_per_pixel() -> u32 {
    1
}

fn default_pattern() -> String {
    "stratified".to_string()
}

fn default_integrator() -> String {
    "average".to_string()
}

fn default_max_samples() -> u32 {
    64
}

fn default_variance_threshold() -> f32 {
    0.01
}

fn default_adaptation_levels() -> u32 {
    3
}

impl Default for MultisamplingSettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: default_samples_per_pixel(),
            sampling_pattern: default_pattern(),
            sample_integrator: default_integrator(),
            max_samples_per_pixel: default_max_samples(),
            variance_threshold: default_variance_threshold(),
            adaptation_levels: default_adaptation_levels(),
        }
    }
}

/// Image-level render settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub multisampling: MultisamplingSettings,
    /// Color returned for rays that escape the scene.
    #[serde(default)]
    pub background: Vec3,
    /// Maximum number of mirror bounces followed per pixel sample.
    #[serde(default = "default_max_reflection_depth")]
    pub max_reflection_depth: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
}

fn default_max_reflection_depth() -> u32 {
    5
}

fn default_tile_size() -> u32 {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    pub color: Vec3,
    #[serde(default)]
    pub reflectance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleDescription {
    pub vertex1: Vec3,
    pub vertex2: Vec3,
    pub vertex3: Vec3,
    pub color: Vec3,
    #[serde(default)]
    pub reflectance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxDescription {
    pub min_corner: Vec3,
    pub max_corner: Vec3,
    pub color: Vec3,
    #[serde(default)]
    pub reflectance: f32,
}

/// A mesh reference. The triangle data lives in an external file; resolving
/// `filename` into geometry is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDescription {
    pub filename: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_scale")]
    pub scale: f32,
    pub color: Vec3,
    #[serde(default)]
    pub reflectance: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// How a rectangular area light distributes its shadow samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSamplingMethod {
    Stratified,
    PoissonDisk,
}

impl Default for AreaSamplingMethod {
    fn default() -> Self {
        AreaSamplingMethod::Stratified
    }
}

/// A light source. Point lights ignore the area fields; rectangular area
/// lights span `width x height` along the `u_axis`/`v_axis` directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDescription {
    PointLight {
        position: Vec3,
        color: Vec3,
        #[serde(default = "default_intensity")]
        intensity: f32,
        /// Distance falloff: `1 / (constant + linear*d + quadratic*d^2)`.
        #[serde(default = "default_attenuation_constant")]
        attenuation_constant: f32,
        #[serde(default)]
        attenuation_linear: f32,
        #[serde(default)]
        attenuation_quadratic: f32,
    },
    RectangularAreaLight {
        position: Vec3,
        u_axis: Vec3,
        v_axis: Vec3,
        width: f32,
        height: f32,
        color: Vec3,
        #[serde(default = "default_intensity")]
        intensity: f32,
        #[serde(default = "default_light_samples")]
        samples: u32,
        #[serde(default)]
        sampling_method: AreaSamplingMethod,
    },
}

fn default_intensity() -> f32 {
    1.0
}

fn default_attenuation_constant() -> f32 {
    1.0
}

fn default_light_samples() -> u32 {
    16
}

/// A complete parsed scene: everything the renderer needs to produce pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraSettings,
    pub render: RenderSettings,
    #[serde(default)]
    pub spheres: Vec<SphereDescription>,
    #[serde(default)]
    pub triangles: Vec<TriangleDescription>,
    #[serde(default)]
    pub boxes: Vec<BoxDescription>,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
    #[serde(default)]
    pub lights: Vec<LightDescription>,
}
