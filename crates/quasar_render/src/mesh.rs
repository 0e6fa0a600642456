//! Triangle mesh with an optional BVH index.

use quasar_math::{Aabb, Ray, Vec3};

use crate::bvh::{Bvh, BvhHit};
use crate::triangle::Triangle;

/// A triangle soup, optionally indexed by a [`Bvh`].
///
/// The index is built explicitly via [`Mesh::build_bvh`] and dropped by any
/// mutation of the geometry; queries fall back to a linear scan while no
/// index exists, so a mesh is always safe to intersect.
#[derive(Debug, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    bvh: Option<Bvh>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            bvh: None,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn has_bvh(&self) -> bool {
        self.bvh.is_some()
    }

    /// Bounding box over all vertices.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for triangle in &self.triangles {
            bounds.expand_box(&triangle.bounding_box());
        }
        bounds
    }

    /// Scale every vertex about the origin, then translate.
    ///
    /// Invalidates any built index; call [`Mesh::build_bvh`] again before
    /// rendering.
    pub fn transform(&mut self, translation: Vec3, scale: f32) {
        for triangle in &mut self.triangles {
            triangle.v0 = triangle.v0 * scale + translation;
            triangle.v1 = triangle.v1 * scale + translation;
            triangle.v2 = triangle.v2 * scale + translation;
        }
        self.bvh = None;
    }

    /// Build the spatial index over the current geometry.
    pub fn build_bvh(&mut self) {
        self.bvh = Some(Bvh::build(&self.triangles));
    }

    /// Closest triangle hit, through the index when built.
    pub fn intersect(&self, ray: &Ray) -> Option<BvhHit> {
        match &self.bvh {
            Some(bvh) => bvh.intersect(ray, &self.triangles),
            None => self.intersect_linear(ray),
        }
    }

    fn intersect_linear(&self, ray: &Ray) -> Option<BvhHit> {
        let mut best: Option<BvhHit> = None;

        for (i, triangle) in self.triangles.iter().enumerate() {
            if let Some(hit) = triangle.intersect(ray) {
                if hit.t > 1e-3 && best.map_or(true, |b| hit.t < b.t) {
                    let mut normal = triangle.normal();
                    if normal.dot(ray.origin - hit.point) < 0.0 {
                        normal = -normal;
                    }
                    best = Some(BvhHit {
                        t: hit.t,
                        point: hit.point,
                        normal,
                        barycentric: hit.barycentric,
                        triangle_index: i as u32,
                    });
                }
            }
        }

        best
    }
}
