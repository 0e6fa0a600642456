//! Scene aggregate: primitives, materials, lights, and the intersection
//! queries the tracer is built on.

use std::sync::Arc;

use quasar_core::{LightDescription, MeshDescription, SceneDescription};
use quasar_math::{Ray, Vec3};
use rand::RngCore;

use crate::cuboid::Cuboid;
use crate::light::{Light, PointLight, RectangularAreaLight};
use crate::material::{Color, Material, SolidMaterial};
use crate::mesh::Mesh;
use crate::shading;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Hits closer than this are treated as self-intersection and skipped.
const T_EPSILON: f32 = 1e-3;
/// Shadow rays start this far along the light direction.
const SHADOW_BIAS: f32 = 0.01;

/// Closest-hit query result. Produced per query, never stored.
pub struct Intersection<'a> {
    pub point: Vec3,
    /// Unit normal oriented toward the ray origin.
    pub normal: Vec3,
    /// Distance along the ray.
    pub distance: f32,
    pub material: &'a dyn Material,
}

struct SphereEntry {
    shape: Sphere,
    material: Arc<dyn Material>,
}

struct TriangleEntry {
    shape: Triangle,
    material: Arc<dyn Material>,
}

struct CuboidEntry {
    shape: Cuboid,
    material: Arc<dyn Material>,
}

struct MeshEntry {
    mesh: Mesh,
    material: Arc<dyn Material>,
}

/// All geometry and lights of one render.
///
/// The scene is mutable while it is being assembled; once [`Scene::prepare`]
/// has run it is only read, so it can be shared by reference across worker
/// threads without locking.
#[derive(Default)]
pub struct Scene {
    spheres: Vec<SphereEntry>,
    triangles: Vec<TriangleEntry>,
    cuboids: Vec<CuboidEntry>,
    meshes: Vec<MeshEntry>,
    lights: Vec<Arc<dyn Light>>,
    background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from a parsed description. Mesh entries are skipped
    /// (with a warning) because no geometry resolver is available; use
    /// [`Scene::from_description_with_meshes`] to supply one.
    pub fn from_description(description: &SceneDescription) -> Self {
        Self::from_description_with_meshes(description, |mesh: &MeshDescription| {
            log::warn!("no mesh resolver configured, skipping '{}'", mesh.filename);
            None
        })
    }

    /// Build a scene from a parsed description, resolving mesh filenames to
    /// triangle soups through the given callback.
    pub fn from_description_with_meshes<F>(
        description: &SceneDescription,
        mut resolve_mesh: F,
    ) -> Self
    where
        F: FnMut(&MeshDescription) -> Option<Vec<Triangle>>,
    {
        let mut scene = Self::new();
        scene.background = description.render.background;

        for sphere in &description.spheres {
            scene.add_sphere(
                Sphere::new(sphere.center, sphere.radius),
                Arc::new(SolidMaterial::with_reflectance(
                    sphere.color,
                    sphere.reflectance,
                )),
            );
        }

        for triangle in &description.triangles {
            scene.add_triangle(
                Triangle::new(triangle.vertex1, triangle.vertex2, triangle.vertex3),
                Arc::new(SolidMaterial::with_reflectance(
                    triangle.color,
                    triangle.reflectance,
                )),
            );
        }

        for cuboid in &description.boxes {
            scene.add_cuboid(
                Cuboid::new(cuboid.min_corner, cuboid.max_corner),
                Arc::new(SolidMaterial::with_reflectance(
                    cuboid.color,
                    cuboid.reflectance,
                )),
            );
        }

        for mesh_desc in &description.meshes {
            let Some(triangles) = resolve_mesh(mesh_desc) else {
                continue;
            };
            let mut mesh = Mesh::new(triangles);
            mesh.transform(mesh_desc.position, mesh_desc.scale);
            log::info!(
                "loaded mesh '{}' with {} triangles",
                mesh_desc.filename,
                mesh.triangle_count()
            );
            scene.add_mesh(
                mesh,
                Arc::new(SolidMaterial::with_reflectance(
                    mesh_desc.color,
                    mesh_desc.reflectance,
                )),
            );
        }

        for light in &description.lights {
            match light {
                LightDescription::PointLight {
                    position,
                    color,
                    intensity,
                    attenuation_constant,
                    attenuation_linear,
                    attenuation_quadratic,
                } => {
                    scene.add_light(Arc::new(PointLight::with_attenuation(
                        *position,
                        *color * *intensity,
                        *attenuation_constant,
                        *attenuation_linear,
                        *attenuation_quadratic,
                    )));
                }
                LightDescription::RectangularAreaLight {
                    position,
                    u_axis,
                    v_axis,
                    width,
                    height,
                    color,
                    intensity,
                    samples,
                    sampling_method,
                } => {
                    scene.add_light(Arc::new(RectangularAreaLight::new(
                        *position,
                        *u_axis,
                        *v_axis,
                        *width,
                        *height,
                        *color * *intensity,
                        *samples,
                        *sampling_method,
                    )));
                }
            }
        }

        scene
    }

    pub fn add_sphere(&mut self, shape: Sphere, material: Arc<dyn Material>) {
        self.spheres.push(SphereEntry { shape, material });
    }

    pub fn add_triangle(&mut self, shape: Triangle, material: Arc<dyn Material>) {
        self.triangles.push(TriangleEntry { shape, material });
    }

    pub fn add_cuboid(&mut self, shape: Cuboid, material: Arc<dyn Material>) {
        self.cuboids.push(CuboidEntry { shape, material });
    }

    pub fn add_mesh(&mut self, mesh: Mesh, material: Arc<dyn Material>) {
        self.meshes.push(MeshEntry { mesh, material });
    }

    pub fn add_light(&mut self, light: Arc<dyn Light>) {
        self.lights.push(light);
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    /// Build every mesh's spatial index.
    ///
    /// Must run before the scene is shared across render workers: queries on
    /// an unprepared scene still work but fall back to linear scans.
    pub fn prepare(&mut self) {
        for entry in &mut self.meshes {
            if !entry.mesh.has_bvh() {
                entry.mesh.build_bvh();
            }
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.meshes.iter().all(|entry| entry.mesh.has_bvh())
    }

    /// Nearest hit across every primitive category with `t > epsilon`.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut closest_t = f32::INFINITY;
        let mut best: Option<Intersection<'_>> = None;

        for entry in &self.spheres {
            if let Some(hit) = entry.shape.intersect(ray) {
                let t = hit.t_near;
                if t > T_EPSILON && t < closest_t {
                    closest_t = t;
                    let point = ray.at(t);
                    let mut normal = entry.shape.normal_at(point);
                    if normal.dot(ray.origin - point) < 0.0 {
                        normal = -normal;
                    }
                    best = Some(Intersection {
                        point,
                        normal,
                        distance: t,
                        material: entry.material.as_ref(),
                    });
                }
            }
        }

        for entry in &self.triangles {
            if let Some(hit) = entry.shape.intersect(ray) {
                if hit.t > T_EPSILON && hit.t < closest_t {
                    closest_t = hit.t;
                    best = Some(Intersection {
                        point: hit.point,
                        normal: oriented_normal(&entry.shape, ray, hit.point),
                        distance: hit.t,
                        material: entry.material.as_ref(),
                    });
                }
            }
        }

        for entry in &self.cuboids {
            for triangle in entry.shape.triangles() {
                if let Some(hit) = triangle.intersect(ray) {
                    if hit.t > T_EPSILON && hit.t < closest_t {
                        closest_t = hit.t;
                        best = Some(Intersection {
                            point: hit.point,
                            normal: oriented_normal(triangle, ray, hit.point),
                            distance: hit.t,
                            material: entry.material.as_ref(),
                        });
                    }
                }
            }
        }

        for entry in &self.meshes {
            if let Some(hit) = entry.mesh.intersect(ray) {
                if hit.t > T_EPSILON && hit.t < closest_t {
                    closest_t = hit.t;
                    best = Some(Intersection {
                        point: hit.point,
                        normal: hit.normal,
                        distance: hit.t,
                        material: entry.material.as_ref(),
                    });
                }
            }
        }

        best
    }

    /// Whether anything blocks the path from a surface point to a light.
    ///
    /// The shadow ray starts `SHADOW_BIAS` along the light direction so the
    /// surface does not occlude itself; an occluder must also sit clearly in
    /// front of the light to count.
    pub fn is_in_shadow(
        &self,
        surface_point: Vec3,
        light_direction: Vec3,
        light_distance: f32,
    ) -> bool {
        let shadow_origin = surface_point + light_direction * SHADOW_BIAS;
        let shadow_ray = Ray::new(shadow_origin, light_direction);

        match self.closest_intersection(&shadow_ray) {
            Some(hit) => hit.distance < light_distance - SHADOW_BIAS,
            None => false,
        }
    }

    /// Direct (single-bounce) color seen along a ray: Phong-lit surface
    /// color at the nearest hit, or the background.
    pub fn shade(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        match self.closest_intersection(ray) {
            Some(hit) => self.shade_intersection(ray, &hit, rng),
            None => self.background,
        }
    }

    /// Phong-lit color for an already-found intersection.
    pub fn shade_intersection(
        &self,
        ray: &Ray,
        hit: &Intersection<'_>,
        rng: &mut dyn RngCore,
    ) -> Color {
        let view_direction = (ray.origin - hit.point).normalize_or_zero();

        shading::calculate_lighting(
            hit.point,
            hit.normal,
            view_direction,
            hit.material,
            &self.lights,
            rng,
            |point, light_dir, light_dist| self.is_in_shadow(point, light_dir, light_dist),
        )
    }
}

fn oriented_normal(triangle: &Triangle, ray: &Ray, hit_point: Vec3) -> Vec3 {
    let mut normal = triangle.normal();
    if normal.dot(ray.origin - hit_point) < 0.0 {
        normal = -normal;
    }
    normal
}
