//! Axis-aligned box primitive, tessellated into triangles.

use quasar_math::Vec3;

use crate::triangle::Triangle;

/// An axis-aligned box defined by its minimum and maximum corners and stored
/// as 12 triangles (2 per face) so the triangle intersection path covers it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    triangles: [Triangle; 12],
}

impl Cuboid {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let v = Self::corner_vertices(min, max);

        // Winding is counter-clockwise seen from outside each face.
        let triangles = [
            // Bottom face (y = min.y)
            Triangle::new(v[0], v[1], v[2]),
            Triangle::new(v[0], v[2], v[3]),
            // Top face (y = max.y)
            Triangle::new(v[4], v[6], v[5]),
            Triangle::new(v[4], v[7], v[6]),
            // Front face (z = max.z)
            Triangle::new(v[3], v[2], v[6]),
            Triangle::new(v[3], v[6], v[7]),
            // Back face (z = min.z)
            Triangle::new(v[0], v[4], v[5]),
            Triangle::new(v[0], v[5], v[1]),
            // Right face (x = max.x)
            Triangle::new(v[1], v[5], v[6]),
            Triangle::new(v[1], v[6], v[2]),
            // Left face (x = min.x)
            Triangle::new(v[0], v[3], v[7]),
            Triangle::new(v[0], v[7], v[4]),
        ];

        Self {
            min,
            max,
            triangles,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn triangles(&self) -> &[Triangle; 12] {
        &self.triangles
    }

    fn corner_vertices(min: Vec3, max: Vec3) -> [Vec3; 8] {
        [
            // Bottom face (y = min.y)
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, min.y, max.z),
            // Top face (y = max.y)
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_math::Ray;

    #[test]
    fn test_cuboid_triangle_count() {
        let cuboid = Cuboid::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cuboid.triangles().len(), 12);
    }

    #[test]
    fn test_cuboid_hit_every_face() {
        let cuboid = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0));

        // A ray shot inward along each axis from outside must hit some face
        let probes = [
            (Vec3::new(0.0, 0.0, 5.0), -Vec3::Z),
            (Vec3::new(0.0, 0.0, -5.0), Vec3::Z),
            (Vec3::new(5.0, 0.0, 0.0), -Vec3::X),
            (Vec3::new(-5.0, 0.0, 0.0), Vec3::X),
            (Vec3::new(0.0, 5.0, 0.0), -Vec3::Y),
            (Vec3::new(0.0, -5.0, 0.0), Vec3::Y),
        ];

        for (origin, direction) in probes {
            let ray = Ray::new(origin, direction);
            let hit = cuboid
                .triangles()
                .iter()
                .filter_map(|t| t.intersect(&ray))
                .min_by(|a, b| a.t.total_cmp(&b.t));
            let hit = hit.unwrap_or_else(|| panic!("no hit from {origin:?}"));
            assert!((hit.t - 4.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_flat_cuboid_does_not_crash() {
        // Zero-thickness box: degenerate faces simply report no hit
        let cuboid = Cuboid::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let ray = Ray::new(Vec3::new(0.5, 5.0, 0.5), -Vec3::Y);

        let _ = cuboid
            .triangles()
            .iter()
            .filter_map(|t| t.intersect(&ray))
            .count();
    }
}
