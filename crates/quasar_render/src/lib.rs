//! Quasar render core - offline CPU raytracing.
//!
//! A Whitted-style raytracer built from:
//! - pure primitive intersection tests (sphere, triangle, box, mesh)
//! - a flat-array BVH for triangle-heavy geometry
//! - scene-level closest-hit and shadow queries with Phong shading
//! - an explicit-stack reflective tracer
//! - pluggable sub-pixel sampling patterns and integrators
//! - a tile-parallel scheduler with shared progress counters

mod bvh;
mod camera;
mod cuboid;
mod light;
mod material;
mod mesh;
mod renderer;
mod sampling;
mod scene;
mod shading;
mod sphere;
mod tile;
mod tracer;
mod triangle;

pub use bvh::{Bvh, BvhHit};
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use light::{Light, LightSample, PointLight, RectangularAreaLight};
pub use material::{Color, Material, SolidMaterial};
pub use mesh::Mesh;
pub use renderer::{render_async, RenderConfig, RenderError, RenderHandle};
pub use sampling::{
    luminance, AdaptiveIntegrator, BlueNoisePattern, PoissonDiskPattern, Sample2D,
    SampleIntegrator, SamplePattern, SamplingError, StratifiedPattern,
};
pub use scene::{Intersection, Scene};
pub use shading::calculate_lighting;
pub use sphere::{Sphere, SphereHit};
pub use tile::{generate_tiles, RenderProgress, Tile};
pub use tracer::{reflect_ray, RayTracer};
pub use triangle::{Triangle, TriangleHit};

/// Re-export math types from quasar_math
pub use quasar_math::{Aabb, Interval, Ray, Vec3};
