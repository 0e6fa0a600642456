//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use quasar_math::{Aabb, Ray, Vec3};

const DETERMINANT_EPSILON: f32 = 1e-8;

/// A triangle defined by three vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

/// Result of a ray-triangle intersection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriangleHit {
    /// Distance along the ray.
    pub t: f32,
    /// World-space intersection point.
    pub point: Vec3,
    /// Barycentric coordinates (w, u, v); they sum to 1.
    pub barycentric: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Geometric unit normal. Degenerate triangles yield the zero vector.
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(edge2).normalize_or_zero()
    }

    /// Centroid of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Bounding box over the vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut bbox = Aabb::EMPTY;
        bbox.expand_point(self.v0);
        bbox.expand_point(self.v1);
        bbox.expand_point(self.v2);
        bbox
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// The determinant guard rejects parallel rays and zero-area triangles
    /// before any division can produce NaN.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < DETERMINANT_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t <= DETERMINANT_EPSILON {
            return None;
        }

        Some(TriangleHit {
            t,
            point: ray.at(t),
            barycentric: Vec3::new(1.0 - u - v, u, v),
        })
    }
}
